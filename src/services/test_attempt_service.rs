use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    auth::{is_owner_or_admin, Claims},
    errors::{AppError, AppResult},
    models::{
        domain::{GradingRecord, Test, TestAttempt},
        dto::{
            request::SubmitAnswerRequest,
            response::{AttemptHistoryEntry, QuestionForTaking},
        },
    },
    repositories::{TestAttemptRepository, TestRepository},
    services::{
        answer_grader::AnswerGrader,
        answer_redaction::AnswerKeyRedactor,
        attempt_scorer::{AttemptOutcome, AttemptScorer},
    },
};

/// Rounds of re-reading an attempt whose answers kept changing while it was being finished.
const MAX_FINISH_ROUNDS: usize = 3;

/// The taker side: starting, answering and finishing attempts.
pub struct TestAttemptService {
    tests: Arc<dyn TestRepository>,
    attempts: Arc<dyn TestAttemptRepository>,
}

impl TestAttemptService {
    pub fn new(tests: Arc<dyn TestRepository>, attempts: Arc<dyn TestAttemptRepository>) -> Self {
        Self { tests, attempts }
    }

    async fn test_by_public_id(&self, public_id: &str) -> AppResult<Test> {
        self.tests
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test '{}' not found", public_id)))
    }

    async fn test_by_id(&self, test_id: &str) -> AppResult<Test> {
        self.tests
            .find_by_id(test_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test with id '{}' not found", test_id)))
    }

    /// Someone else's attempt looks exactly like a missing one.
    async fn own_attempt(&self, actor: &Claims, attempt_id: &str) -> AppResult<TestAttempt> {
        self.attempts
            .find_by_id(attempt_id)
            .await?
            .filter(|attempt| attempt.user_id == actor.sub)
            .ok_or_else(|| AppError::NotFound(format!("Attempt '{}' not found", attempt_id)))
    }

    pub async fn start_attempt(&self, actor: &Claims, public_id: &str) -> AppResult<TestAttempt> {
        let test = self.test_by_public_id(public_id).await?;

        if !test.is_accepting_attempts() {
            log::warn!(
                "User '{}' tried to start test '{}' in status {:?}",
                actor.sub,
                test.id,
                test.status
            );
            return Err(AppError::InvalidState(format!(
                "Test '{}' is not open for attempts",
                test.title
            )));
        }

        let attempt = self
            .attempts
            .create(TestAttempt::start(&actor.sub, &test.id))
            .await?;
        log::info!(
            "Attempt '{}' started by '{}' on test '{}'",
            attempt.id,
            actor.sub,
            test.id
        );
        Ok(attempt)
    }

    /// Questions in `order_num` order. The author and admins see the full keys;
    /// anyone else needs an attempt in progress and gets redacted keys.
    pub async fn questions_for_taking(
        &self,
        actor: &Claims,
        public_id: &str,
    ) -> AppResult<Vec<QuestionForTaking>> {
        let test = self.test_by_public_id(public_id).await?;
        let full_view = is_owner_or_admin(actor, &test.author_id);

        if !full_view
            && self
                .attempts
                .find_in_progress(&actor.sub, &test.id)
                .await?
                .is_none()
        {
            return Err(AppError::Forbidden(
                "Start the test before viewing its questions".to_string(),
            ));
        }

        let questions = test
            .ordered_questions()
            .into_iter()
            .map(|question| {
                let answers = if full_view {
                    question.answer_key.to_json()
                } else {
                    AnswerKeyRedactor::redact(&question.answer_key).to_json()
                };

                QuestionForTaking {
                    id: question.id.clone(),
                    text: question.text.clone(),
                    question_type: question.answer_key.type_name().to_string(),
                    points: question.points,
                    order_num: question.order_num,
                    answers,
                }
            })
            .collect();

        Ok(questions)
    }

    /// Grades the answer and stores it as the attempt's record for that
    /// question, replacing an earlier one.
    pub async fn submit_answer(
        &self,
        actor: &Claims,
        attempt_id: &str,
        request: SubmitAnswerRequest,
    ) -> AppResult<GradingRecord> {
        request.validate()?;

        let attempt = self.own_attempt(actor, attempt_id).await?;
        if let Err(err) = attempt.ensure_in_progress() {
            log::warn!("Rejected answer for finished attempt '{}'", attempt.id);
            return Err(err);
        }

        let test = self.test_by_id(&attempt.test_id).await?;
        let question = test.question(&request.question_id).ok_or_else(|| {
            AppError::NotFound(format!(
                "Question '{}' does not belong to this test",
                request.question_id
            ))
        })?;

        let grade = AnswerGrader::grade(question, &request.selected_answer);
        let record = GradingRecord {
            question_id: question.id.clone(),
            selected_answer: request.selected_answer,
            is_correct: grade.is_correct,
            points_awarded: grade.points_awarded,
            answered_at: Utc::now(),
        };

        if !self.attempts.record_answer(&attempt.id, record.clone()).await? {
            // Finished (or removed) between the read above and the write.
            let current = self.own_attempt(actor, attempt_id).await?;
            current.ensure_in_progress()?;
            return Err(AppError::Conflict(format!(
                "Answer for attempt '{}' could not be recorded",
                attempt_id
            )));
        }

        log::info!(
            "Answer recorded for question '{}' in attempt '{}' (correct: {})",
            record.question_id,
            attempt.id,
            record.is_correct
        );
        Ok(record)
    }

    /// Scores the attempt from its stored records and moves it to finished.
    ///
    /// The transition only applies if no answer was recorded since the read;
    /// otherwise the attempt is re-read and re-scored.
    pub async fn finish_attempt(
        &self,
        actor: &Claims,
        attempt_id: &str,
    ) -> AppResult<AttemptOutcome> {
        let mut cached_test: Option<Test> = None;

        for _ in 0..MAX_FINISH_ROUNDS {
            let attempt = self.own_attempt(actor, attempt_id).await?;
            if let Err(err) = attempt.ensure_in_progress() {
                log::warn!("Rejected finish of already finished attempt '{}'", attempt.id);
                return Err(err);
            }

            let test = match cached_test.take() {
                Some(test) => test,
                None => self.test_by_id(&attempt.test_id).await?,
            };

            let outcome =
                AttemptScorer::finish(&attempt, attempt.grading_records.values(), &test)?;

            if self
                .attempts
                .complete(&attempt.id, attempt.revision, outcome.total_score, Utc::now())
                .await?
            {
                log::info!(
                    "Attempt '{}' finished with score {} (passed: {})",
                    attempt.id,
                    outcome.total_score,
                    outcome.passed
                );
                return Ok(outcome);
            }

            log::debug!("Attempt '{}' changed while finishing, re-reading", attempt.id);
            cached_test = Some(test);
        }

        Err(AppError::Conflict(format!(
            "Attempt '{}' kept changing while it was being finished",
            attempt_id
        )))
    }

    /// The caller's attempts, newest first. Attempts whose test no longer
    /// exists are left out.
    pub async fn attempt_history(&self, actor: &Claims) -> AppResult<Vec<AttemptHistoryEntry>> {
        let mut attempts = self.attempts.find_by_user(&actor.sub).await?;
        attempts.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        let mut tests: HashMap<String, Option<Test>> = HashMap::new();
        let mut entries = Vec::with_capacity(attempts.len());

        for attempt in &attempts {
            if !tests.contains_key(&attempt.test_id) {
                let test = self.tests.find_by_id(&attempt.test_id).await?;
                tests.insert(attempt.test_id.clone(), test);
            }

            match tests.get(&attempt.test_id).and_then(Option::as_ref) {
                Some(test) => entries.push(AttemptHistoryEntry::new(attempt, test)),
                None => log::warn!(
                    "Attempt '{}' references missing test '{}'",
                    attempt.id,
                    attempt.test_id
                ),
            }
        }

        Ok(entries)
    }
}
