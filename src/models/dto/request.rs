use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::domain::{AnswerKey, EvaluationMethod, TestStatus};

fn default_points() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTestRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub time_limit: i32,

    #[serde(default)]
    #[validate(range(min = 0, max = 100000))]
    pub passing_score: i32,

    #[serde(default)]
    pub evaluation_method: EvaluationMethod,

    #[validate(length(max = 1000))]
    pub success_message: Option<String>,

    #[validate(length(max = 1000))]
    pub failure_message: Option<String>,

    #[serde(default)]
    pub status: TestStatus,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTestRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(range(min = 0))]
    pub time_limit: Option<i32>,

    #[validate(range(min = 0, max = 100000))]
    pub passing_score: Option<i32>,

    pub evaluation_method: Option<EvaluationMethod>,

    #[validate(length(max = 1000))]
    pub success_message: Option<String>,

    #[validate(length(max = 1000))]
    pub failure_message: Option<String>,

    pub status: Option<TestStatus>,
}

/// Body for adding a question and for replacing one.
///
/// The answer key arrives as `{"type": ..., "answer_key": {...}}` next to
/// the other fields.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,

    #[serde(default = "default_points")]
    #[validate(range(min = 0, max = 1000))]
    pub points: i32,

    #[validate(range(min = 1, max = 10000))]
    pub order_num: Option<i32>,

    #[serde(flatten)]
    pub answer_key: AnswerKey,
}

impl QuestionRequest {
    pub fn validate_all(&self) -> AppResult<()> {
        self.validate()?;
        self.answer_key.validate_for_authoring()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1))]
    pub question_id: String,

    /// Shape depends on the question type; a wrong shape grades as incorrect.
    #[serde(default)]
    pub selected_answer: Value,
}

/// Percent thresholds above 100 can never be met.
pub fn check_passing_score(method: EvaluationMethod, passing_score: i32) -> AppResult<()> {
    if method == EvaluationMethod::Percent && passing_score > 100 {
        return Err(AppError::ValidationError(format!(
            "passing_score {} is above 100 for percent evaluation",
            passing_score
        )));
    }
    Ok(())
}
