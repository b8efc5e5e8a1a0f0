use crate::{
    errors::{AppError, AppResult},
    models::domain::{EvaluationMethod, GradingRecord, Test, TestAttempt},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub total_score: i32,
    pub passed: bool,
    pub feedback: String,
}

pub struct AttemptScorer;

impl AttemptScorer {
    /// Score an attempt that is about to be finished.
    ///
    /// Fails with `InvalidState` when the attempt is already finished. Applying
    /// the outcome (status, score, finish time) is left to the caller, which
    /// must do it as a single update.
    pub fn finish<'a>(
        attempt: &TestAttempt,
        grading_records: impl IntoIterator<Item = &'a GradingRecord>,
        test: &Test,
    ) -> AppResult<AttemptOutcome> {
        attempt.ensure_in_progress()?;

        let total_score: i64 = grading_records
            .into_iter()
            .map(|record| i64::from(record.points_awarded))
            .sum();
        let total_score = i32::try_from(total_score).map_err(|_| {
            AppError::InternalError(format!(
                "Score {} for attempt '{}' is out of range",
                total_score, attempt.id
            ))
        })?;
        let passed = Self::is_passing(test, total_score);

        Ok(AttemptOutcome {
            total_score,
            passed,
            feedback: test.feedback(passed).to_string(),
        })
    }

    pub fn is_passing(test: &Test, total_score: i32) -> bool {
        match test.evaluation_method {
            EvaluationMethod::Points => total_score >= test.passing_score,
            EvaluationMethod::Percent => {
                let max_score = test.max_score();
                if max_score <= 0 {
                    return false;
                }
                let percent = (f64::from(total_score) / max_score as f64) * 100.0;
                percent >= f64::from(test.passing_score)
            }
        }
    }
}
