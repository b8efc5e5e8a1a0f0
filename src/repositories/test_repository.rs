use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::{Question, Test},
};

/// Tests are stored with their questions embedded, so a test and its
/// questions always load together.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestRepository: Send + Sync {
    async fn create(&self, test: Test) -> AppResult<Test>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Test>>;
    async fn find_by_public_id(&self, public_id: &str) -> AppResult<Option<Test>>;
    async fn list_all(&self) -> AppResult<Vec<Test>>;
    async fn list_by_author(&self, author_id: &str) -> AppResult<Vec<Test>>;
    /// Writes every field except the questions. Returns false when the test is gone.
    async fn update_details(&self, test: &Test) -> AppResult<bool>;
    async fn delete(&self, id: &str) -> AppResult<bool>;
    async fn push_question(&self, test_id: &str, question: Question) -> AppResult<bool>;
    async fn replace_question(&self, test_id: &str, question: Question) -> AppResult<bool>;
    async fn remove_question(&self, test_id: &str, question_id: &str) -> AppResult<bool>;
}

pub struct MongoTestRepository {
    collection: Collection<Test>,
}

impl MongoTestRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.tests();
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for tests collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let public_id_index = IndexModel::builder()
            .keys(doc! { "public_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("public_id_unique".to_string())
                    .build(),
            )
            .build();

        let author_index = IndexModel::builder()
            .keys(doc! { "author_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("author_id".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(public_id_index).await?;
        self.collection.create_index(author_index).await?;

        log::info!("Successfully created indexes for tests collection");
        Ok(())
    }
}

#[async_trait]
impl TestRepository for MongoTestRepository {
    async fn create(&self, test: Test) -> AppResult<Test> {
        self.collection.insert_one(&test).await?;
        Ok(test)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Test>> {
        let test = self.collection.find_one(doc! { "id": id }).await?;
        Ok(test)
    }

    async fn find_by_public_id(&self, public_id: &str) -> AppResult<Option<Test>> {
        let test = self
            .collection
            .find_one(doc! { "public_id": public_id })
            .await?;
        Ok(test)
    }

    async fn list_all(&self) -> AppResult<Vec<Test>> {
        let tests = self
            .collection
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(tests)
    }

    async fn list_by_author(&self, author_id: &str) -> AppResult<Vec<Test>> {
        let tests = self
            .collection
            .find(doc! { "author_id": author_id })
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(tests)
    }

    async fn update_details(&self, test: &Test) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "id": &test.id },
                doc! {
                    "$set": {
                        "title": &test.title,
                        "description": &test.description,
                        "time_limit": test.time_limit,
                        "passing_score": test.passing_score,
                        "evaluation_method": to_bson(&test.evaluation_method)?,
                        "success_message": &test.success_message,
                        "failure_message": &test.failure_message,
                        "status": to_bson(&test.status)?,
                        "updated_at": to_bson(&Utc::now())?,
                    }
                },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn push_question(&self, test_id: &str, question: Question) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "id": test_id },
                doc! {
                    "$push": { "questions": to_bson(&question)? },
                    "$set": { "updated_at": to_bson(&Utc::now())? },
                },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn replace_question(&self, test_id: &str, question: Question) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "id": test_id, "questions.id": &question.id },
                doc! {
                    "$set": {
                        "questions.$": to_bson(&question)?,
                        "updated_at": to_bson(&Utc::now())?,
                    }
                },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn remove_question(&self, test_id: &str, question_id: &str) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "id": test_id, "questions.id": question_id },
                doc! {
                    "$pull": { "questions": { "id": question_id } },
                    "$set": { "updated_at": to_bson(&Utc::now())? },
                },
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}
