use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};
use std::time::Duration;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{Test, TestAttempt},
};

pub const TESTS_COLLECTION: &str = "tests";
pub const ATTEMPTS_COLLECTION: &str = "test_attempts";

const APP_NAME: &str = "test-constructor-server";

/// Handle to the MongoDB database holding tests and their attempts.
#[derive(Clone)]
pub struct Database {
    client: Client,
    db_name: String,
}

impl Database {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut options = ClientOptions::parse(&config.mongo_conn_string)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Invalid MongoDB connection string: {}", e)))?;

        options.app_name = Some(APP_NAME.to_string());
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.max_pool_size = Some(10);
        options.min_pool_size = Some(2);
        options.connect_timeout = Some(Duration::from_secs(5));
        options.server_selection_timeout = Some(Duration::from_secs(5));

        let database = Self {
            client: Client::with_options(options)?,
            db_name: config.mongo_db_name.clone(),
        };

        if let Err(err) = database.ping().await {
            log::error!("MongoDB did not answer ping at startup: {}", err);
            return Err(err);
        }

        log::info!(
            "Connected to MongoDB, storing tests in '{}.{}' and attempts in '{}.{}'",
            database.db_name,
            TESTS_COLLECTION,
            database.db_name,
            ATTEMPTS_COLLECTION
        );
        Ok(database)
    }

    pub fn tests(&self) -> Collection<Test> {
        self.collection(TESTS_COLLECTION)
    }

    pub fn attempts(&self) -> Collection<TestAttempt> {
        self.collection(ATTEMPTS_COLLECTION)
    }

    /// Readiness probe used by `/ready`.
    pub async fn health_check(&self) -> AppResult<()> {
        self.ping().await
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.client.database(&self.db_name).collection(name)
    }

    async fn ping(&self) -> AppResult<()> {
        self.client
            .database(&self.db_name)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}
