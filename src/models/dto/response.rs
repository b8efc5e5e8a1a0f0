use async_graphql::{ComplexObject, Json, SimpleObject};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::domain::{
    AttemptStatus, EvaluationMethod, GradingRecord, Question, Test, TestAttempt, TestStatus,
};
use crate::services::attempt_scorer::AttemptOutcome;

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: String,
}

/// Author view of a test, without its questions.
#[derive(Debug, Clone, Serialize)]
pub struct TestDto {
    pub id: String,
    pub public_id: String,
    pub author_id: String,
    pub title: String,
    pub description: String,
    pub time_limit: i32,
    pub passing_score: i32,
    pub evaluation_method: EvaluationMethod,
    pub success_message: String,
    pub failure_message: String,
    pub status: TestStatus,
    pub question_count: usize,
    pub max_score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Test> for TestDto {
    fn from(test: Test) -> Self {
        TestDto {
            question_count: test.questions.len(),
            max_score: test.max_score(),
            id: test.id,
            public_id: test.public_id,
            author_id: test.author_id,
            title: test.title,
            description: test.description,
            time_limit: test.time_limit,
            passing_score: test.passing_score,
            evaluation_method: test.evaluation_method,
            success_message: test.success_message,
            failure_message: test.failure_message,
            status: test.status,
            created_at: test.created_at,
            updated_at: test.updated_at,
        }
    }
}

/// Cover page shown before a test is started.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct PublicTestDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub time_limit: i32,
}

impl From<Test> for PublicTestDto {
    fn from(test: Test) -> Self {
        PublicTestDto {
            id: test.id,
            title: test.title,
            description: test.description,
            time_limit: test.time_limit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareLinkResponse {
    pub test_id: String,
    pub public_id: String,
    pub url: String,
}

/// Author view of a question, including its full answer key.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorQuestionDto {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub points: i32,
    pub order_num: i32,
    pub answer_key: Value,
}

impl From<&Question> for AuthorQuestionDto {
    fn from(question: &Question) -> Self {
        AuthorQuestionDto {
            id: question.id.clone(),
            text: question.text.clone(),
            question_type: question.answer_key.type_name().to_string(),
            points: question.points,
            order_num: question.order_num,
            answer_key: question.answer_key.to_json(),
        }
    }
}

/// A question as served to someone taking the test. `answers` is redacted
/// unless the viewer is the author or an admin.
#[derive(Debug, Clone, Serialize, SimpleObject)]
#[graphql(complex)]
pub struct QuestionForTaking {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    #[graphql(name = "type")]
    pub question_type: String,
    pub points: i32,
    pub order_num: i32,
    #[graphql(skip)]
    pub answers: Value,
}

#[ComplexObject]
impl QuestionForTaking {
    #[graphql(name = "answers")]
    async fn answers_json(&self) -> Json<Value> {
        Json(self.answers.clone())
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct StartAttemptResponse {
    pub message: String,
    pub attempt_id: String,
}

impl From<TestAttempt> for StartAttemptResponse {
    fn from(attempt: TestAttempt) -> Self {
        StartAttemptResponse {
            message: "Test started".to_string(),
            attempt_id: attempt.id,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct SubmitAnswerResponse {
    pub message: String,
    pub is_correct: bool,
}

impl From<GradingRecord> for SubmitAnswerResponse {
    fn from(record: GradingRecord) -> Self {
        SubmitAnswerResponse {
            message: "Answer saved".to_string(),
            is_correct: record.is_correct,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct FinishAttemptResponse {
    pub message: String,
    pub total_score: i32,
    pub passed: bool,
    pub feedback: String,
}

impl From<AttemptOutcome> for FinishAttemptResponse {
    fn from(outcome: AttemptOutcome) -> Self {
        FinishAttemptResponse {
            message: "Test finished".to_string(),
            total_score: outcome.total_score,
            passed: outcome.passed,
            feedback: outcome.feedback,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct AttemptHistoryEntry {
    pub attempt_id: String,
    pub test_title: String,
    pub status: AttemptStatus,
    pub score: i32,
    /// The test's passing score, shown next to the attempt score.
    pub max_score: i32,
    pub date: DateTime<Utc>,
}

impl AttemptHistoryEntry {
    pub fn new(attempt: &TestAttempt, test: &Test) -> Self {
        AttemptHistoryEntry {
            attempt_id: attempt.id.clone(),
            test_title: test.title.clone(),
            status: attempt.status,
            score: attempt.total_score,
            max_score: test.passing_score,
            date: attempt.history_date(),
        }
    }
}
