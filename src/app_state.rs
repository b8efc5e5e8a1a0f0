use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoTestAttemptRepository, MongoTestRepository, TestAttemptRepository, TestRepository,
    },
    services::{TestAttemptService, TestService},
};

#[derive(Clone)]
pub struct AppState {
    pub test_service: Arc<TestService>,
    pub attempt_service: Arc<TestAttemptService>,
    pub config: Arc<Config>,
    /// Absent when the state is built over non-Mongo repositories.
    pub db: Option<Database>,
}

impl AppState {
    pub async fn new(db: Database, config: Config) -> AppResult<Self> {
        let test_repository = Arc::new(MongoTestRepository::new(&db));
        test_repository.ensure_indexes().await?;

        let attempt_repository = Arc::new(MongoTestAttemptRepository::new(&db));
        attempt_repository.ensure_indexes().await?;

        let mut state = Self::with_repositories(test_repository, attempt_repository, config);
        state.db = Some(db);
        Ok(state)
    }

    pub fn with_repositories(
        tests: Arc<dyn TestRepository>,
        attempts: Arc<dyn TestAttemptRepository>,
        config: Config,
    ) -> Self {
        let config = Arc::new(config);

        Self {
            test_service: Arc::new(TestService::new(
                Arc::clone(&tests),
                Arc::clone(&attempts),
                Arc::clone(&config),
            )),
            attempt_service: Arc::new(TestAttemptService::new(tests, attempts)),
            config,
            db: None,
        }
    }
}
