#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tokio::sync::RwLock;

use test_constructor_server::{
    app_state::AppState,
    auth::Claims,
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{
        question::{ChoiceKey, ChoiceOption, InputKey, SequenceItem, SequenceKey},
        AnswerKey, AttemptStatus, GradingRecord, ItemId, Question, Test, TestAttempt, UserRole,
    },
    repositories::{TestAttemptRepository, TestRepository},
};

#[derive(Default)]
pub struct InMemoryTestRepository {
    tests: RwLock<HashMap<String, Test>>,
}

#[async_trait]
impl TestRepository for InMemoryTestRepository {
    async fn create(&self, test: Test) -> AppResult<Test> {
        let mut tests = self.tests.write().await;
        if tests.contains_key(&test.id) {
            return Err(AppError::DatabaseError(format!(
                "Test with id '{}' already exists",
                test.id
            )));
        }
        tests.insert(test.id.clone(), test.clone());
        Ok(test)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Test>> {
        Ok(self.tests.read().await.get(id).cloned())
    }

    async fn find_by_public_id(&self, public_id: &str) -> AppResult<Option<Test>> {
        let tests = self.tests.read().await;
        Ok(tests.values().find(|t| t.public_id == public_id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Test>> {
        Ok(self.tests.read().await.values().cloned().collect())
    }

    async fn list_by_author(&self, author_id: &str) -> AppResult<Vec<Test>> {
        let tests = self.tests.read().await;
        Ok(tests
            .values()
            .filter(|t| t.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn update_details(&self, test: &Test) -> AppResult<bool> {
        let mut tests = self.tests.write().await;
        let Some(stored) = tests.get_mut(&test.id) else {
            return Ok(false);
        };
        let questions = std::mem::take(&mut stored.questions);
        *stored = Test {
            questions,
            updated_at: Some(Utc::now()),
            ..test.clone()
        };
        Ok(true)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.tests.write().await.remove(id).is_some())
    }

    async fn push_question(&self, test_id: &str, question: Question) -> AppResult<bool> {
        let mut tests = self.tests.write().await;
        let Some(test) = tests.get_mut(test_id) else {
            return Ok(false);
        };
        test.questions.push(question);
        Ok(true)
    }

    async fn replace_question(&self, test_id: &str, question: Question) -> AppResult<bool> {
        let mut tests = self.tests.write().await;
        let Some(slot) = tests
            .get_mut(test_id)
            .and_then(|t| t.questions.iter_mut().find(|q| q.id == question.id))
        else {
            return Ok(false);
        };
        *slot = question;
        Ok(true)
    }

    async fn remove_question(&self, test_id: &str, question_id: &str) -> AppResult<bool> {
        let mut tests = self.tests.write().await;
        let Some(test) = tests.get_mut(test_id) else {
            return Ok(false);
        };
        let before = test.questions.len();
        test.questions.retain(|q| q.id != question_id);
        Ok(test.questions.len() != before)
    }
}

/// Mirrors the conditional updates of the Mongo implementation under one lock.
#[derive(Default)]
pub struct InMemoryTestAttemptRepository {
    attempts: RwLock<HashMap<String, TestAttempt>>,
}

impl InMemoryTestAttemptRepository {
    pub async fn get(&self, id: &str) -> Option<TestAttempt> {
        self.attempts.read().await.get(id).cloned()
    }
}

#[async_trait]
impl TestAttemptRepository for InMemoryTestAttemptRepository {
    async fn create(&self, attempt: TestAttempt) -> AppResult<TestAttempt> {
        let mut attempts = self.attempts.write().await;
        attempts.insert(attempt.id.clone(), attempt.clone());
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestAttempt>> {
        Ok(self.get(id).await)
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<TestAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_in_progress(
        &self,
        user_id: &str,
        test_id: &str,
    ) -> AppResult<Option<TestAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .find(|a| {
                a.user_id == user_id && a.test_id == test_id && a.status == AttemptStatus::InProgress
            })
            .cloned())
    }

    async fn record_answer(&self, attempt_id: &str, record: GradingRecord) -> AppResult<bool> {
        let mut attempts = self.attempts.write().await;
        match attempts.get_mut(attempt_id) {
            Some(attempt) if !attempt.is_finished() => Ok(attempt.record_grade(record).is_ok()),
            _ => Ok(false),
        }
    }

    async fn complete(
        &self,
        attempt_id: &str,
        expected_revision: i64,
        total_score: i32,
        finished_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut attempts = self.attempts.write().await;
        match attempts.get_mut(attempt_id) {
            Some(attempt) if !attempt.is_finished() && attempt.revision == expected_revision => {
                Ok(attempt.complete(total_score, finished_at).is_ok())
            }
            _ => Ok(false),
        }
    }

    async fn question_has_answers(&self, test_id: &str, question_id: &str) -> AppResult<bool> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .any(|a| a.test_id == test_id && a.grading_records.contains_key(question_id)))
    }

    async fn delete_by_test(&self, test_id: &str) -> AppResult<u64> {
        let mut attempts = self.attempts.write().await;
        let before = attempts.len();
        attempts.retain(|_, a| a.test_id != test_id);
        Ok((before - attempts.len()) as u64)
    }
}

pub fn test_config() -> Config {
    Config {
        mongo_conn_string: "mongodb://localhost:27017".to_string(),
        mongo_db_name: "test-constructor-it".to_string(),
        web_server_host: "127.0.0.1".to_string(),
        web_server_port: 8080,
        jwt_secret: SecretString::from("integration_test_secret".to_string()),
        jwt_expiration_hours: 1,
        public_base_url: "https://tests.example.com".to_string(),
        cors_allowed_origin: "https://tests.example.com".to_string(),
        app_env: "test".to_string(),
    }
}

pub struct Harness {
    pub state: AppState,
    pub tests: Arc<InMemoryTestRepository>,
    pub attempts: Arc<InMemoryTestAttemptRepository>,
}

impl Harness {
    pub fn new() -> Self {
        let tests = Arc::new(InMemoryTestRepository::default());
        let attempts = Arc::new(InMemoryTestAttemptRepository::default());
        let state = AppState::with_repositories(tests.clone(), attempts.clone(), test_config());
        Self {
            state,
            tests,
            attempts,
        }
    }
}

pub fn claims(user_id: &str, role: UserRole) -> Claims {
    Claims {
        sub: user_id.to_string(),
        email: format!("{}@example.com", user_id),
        role,
        iat: 0,
        exp: 9999999999,
    }
}

pub fn single_choice(correct: i64, ids: &[i64]) -> AnswerKey {
    AnswerKey::Single(ChoiceKey {
        options: ids
            .iter()
            .map(|id| ChoiceOption {
                id: ItemId::Number(*id),
                label: format!("Option {}", id),
                is_correct: Some(*id == correct),
            })
            .collect(),
    })
}

pub fn input(answers: &[&str]) -> AnswerKey {
    AnswerKey::Input(InputKey {
        correct_answers: Some(answers.iter().map(|a| a.to_string()).collect()),
        case_sensitive: false,
    })
}

pub fn sequence(orders: &[(i64, i64)]) -> AnswerKey {
    AnswerKey::Sequence(SequenceKey {
        items: orders
            .iter()
            .map(|(id, order)| SequenceItem {
                id: ItemId::Number(*id),
                label: format!("Step {}", id),
                correct_order: Some(*order),
            })
            .collect(),
    })
}
