use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, Document},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::{AttemptStatus, GradingRecord, TestAttempt},
};

/// Attempts carry their grading records keyed by question id. Every write
/// that changes an attempt is conditional on it still being in progress.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestAttemptRepository: Send + Sync {
    async fn create(&self, attempt: TestAttempt) -> AppResult<TestAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestAttempt>>;
    /// Newest first.
    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<TestAttempt>>;
    async fn find_in_progress(
        &self,
        user_id: &str,
        test_id: &str,
    ) -> AppResult<Option<TestAttempt>>;
    /// Inserts or replaces the record for its question and bumps the revision.
    /// Returns false when no in-progress attempt with that id exists.
    async fn record_answer(&self, attempt_id: &str, record: GradingRecord) -> AppResult<bool>;
    /// Moves the attempt to finished if it is still in progress at
    /// `expected_revision`. Returns false when either condition no longer holds.
    async fn complete(
        &self,
        attempt_id: &str,
        expected_revision: i64,
        total_score: i32,
        finished_at: DateTime<Utc>,
    ) -> AppResult<bool>;
    async fn question_has_answers(&self, test_id: &str, question_id: &str) -> AppResult<bool>;
    async fn delete_by_test(&self, test_id: &str) -> AppResult<u64>;
}

pub struct MongoTestAttemptRepository {
    collection: Collection<TestAttempt>,
}

impl MongoTestAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.attempts();
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for test_attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_test_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "test_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_test".to_string())
                    .build(),
            )
            .build();

        let test_id_index = IndexModel::builder()
            .keys(doc! { "test_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("test_id".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_test_index).await?;
        self.collection.create_index(test_id_index).await?;

        log::info!("Successfully created indexes for test_attempts collection");
        Ok(())
    }
}

fn record_path(question_id: &str) -> String {
    format!("grading_records.{}", question_id)
}

#[async_trait]
impl TestAttemptRepository for MongoTestAttemptRepository {
    async fn create(&self, attempt: TestAttempt) -> AppResult<TestAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<TestAttempt>> {
        let attempts = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "started_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(attempts)
    }

    async fn find_in_progress(
        &self,
        user_id: &str,
        test_id: &str,
    ) -> AppResult<Option<TestAttempt>> {
        let attempt = self
            .collection
            .find_one(doc! {
                "user_id": user_id,
                "test_id": test_id,
                "status": AttemptStatus::InProgress.as_str(),
            })
            .await?;
        Ok(attempt)
    }

    async fn record_answer(&self, attempt_id: &str, record: GradingRecord) -> AppResult<bool> {
        let mut set = Document::new();
        set.insert(record_path(&record.question_id), to_bson(&record)?);

        let result = self
            .collection
            .update_one(
                doc! { "id": attempt_id, "status": AttemptStatus::InProgress.as_str() },
                doc! { "$set": set, "$inc": { "revision": 1_i64 } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn complete(
        &self,
        attempt_id: &str,
        expected_revision: i64,
        total_score: i32,
        finished_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! {
                    "id": attempt_id,
                    "status": AttemptStatus::InProgress.as_str(),
                    "revision": expected_revision,
                },
                doc! {
                    "$set": {
                        "status": AttemptStatus::Finished.as_str(),
                        "total_score": total_score,
                        "finished_at": to_bson(&finished_at)?,
                    }
                },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn question_has_answers(&self, test_id: &str, question_id: &str) -> AppResult<bool> {
        let mut filter = doc! { "test_id": test_id };
        filter.insert(record_path(question_id), doc! { "$exists": true });

        let count = self.collection.count_documents(filter).limit(1).await?;
        Ok(count > 0)
    }

    async fn delete_by_test(&self, test_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "test_id": test_id })
            .await?;
        Ok(result.deleted_count)
    }
}
