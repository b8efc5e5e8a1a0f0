use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, async_graphql::Enum)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    #[default]
    InProgress,
    Finished,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "in_progress",
            AttemptStatus::Finished => "finished",
        }
    }
}

/// Result of the latest submission for one question of one attempt.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GradingRecord {
    pub question_id: String,
    pub selected_answer: Value,
    pub is_correct: bool,
    pub points_awarded: i32,
    pub answered_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TestAttempt {
    pub id: String,
    pub user_id: String,
    pub test_id: String,
    pub status: AttemptStatus,
    pub total_score: i32,
    /// Keyed by question id, so a question has at most one record per attempt.
    #[serde(default)]
    pub grading_records: BTreeMap<String, GradingRecord>,
    /// Bumped on every recorded answer; finishing is conditional on it.
    #[serde(default)]
    pub revision: i64,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl TestAttempt {
    pub fn start(user_id: &str, test_id: &str) -> Self {
        TestAttempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            test_id: test_id.to_string(),
            status: AttemptStatus::InProgress,
            total_score: 0,
            grading_records: BTreeMap::new(),
            revision: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == AttemptStatus::Finished
    }

    pub fn ensure_in_progress(&self) -> AppResult<()> {
        if self.is_finished() {
            return Err(AppError::InvalidState(format!(
                "Attempt '{}' is already finished",
                self.id
            )));
        }
        Ok(())
    }

    /// Stores a record, replacing any earlier one for the same question.
    pub fn record_grade(&mut self, record: GradingRecord) -> AppResult<()> {
        self.ensure_in_progress()?;
        self.grading_records
            .insert(record.question_id.clone(), record);
        self.revision += 1;
        Ok(())
    }

    /// One-way transition to `Finished`.
    pub fn complete(&mut self, total_score: i32, finished_at: DateTime<Utc>) -> AppResult<()> {
        self.ensure_in_progress()?;
        self.status = AttemptStatus::Finished;
        self.total_score = total_score;
        self.finished_at = Some(finished_at);
        Ok(())
    }

    /// Finish time for finished attempts, start time otherwise.
    pub fn history_date(&self) -> DateTime<Utc> {
        self.finished_at.unwrap_or(self.started_at)
    }
}
