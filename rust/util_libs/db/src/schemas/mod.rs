//! Database schemas and types for the Twitter Monitor system.
//!
//! This module defines the document structures stored by the application and
//! their MongoDB index configurations. Each schema lives next to the
//! collection name it is stored under.
//!
//! # Examples
//!
//! ```rust,no_run
//! use db_utils::mongodb::MongoCollection;
//! use db_utils::schemas::{Tweet, DATABASE_NAME, TWEET_COLLECTION_NAME};
//! use mongodb::Client;
//!
//! async fn example() -> Result<(), anyhow::Error> {
//!     let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//!     let db = client.database(DATABASE_NAME);
//!
//!     // Creating the wrapper applies the schema's indices
//!     let tweets = MongoCollection::<Tweet>::new(&db, TWEET_COLLECTION_NAME).await?;
//!     assert_eq!(tweets.index_count(), 6);
//!     Ok(())
//! }
//! ```

pub mod execution_log;
pub mod keyword;
pub mod migration;
pub mod scheduler_job;
pub mod system_setting;
pub mod system_stat;
pub mod tweet;

pub use execution_log::{ExecutionLog, ExecutionStatus, EXECUTION_LOG_COLLECTION_NAME};
pub use keyword::{Keyword, KEYWORD_COLLECTION_NAME};
pub use migration::{MigrationRecord, MIGRATION_COLLECTION_NAME};
pub use scheduler_job::{SchedulerJob, SCHEDULER_JOB_COLLECTION_NAME};
pub use system_setting::{
    default_settings, upsert_default_settings, SystemSetting, SYSTEM_SETTING_COLLECTION_NAME,
};
pub use system_stat::{SystemStat, SYSTEM_STAT_COLLECTION_NAME};
pub use tweet::{Tweet, TWEET_COLLECTION_NAME};

/// Name of the main database for the Twitter Monitor system
pub const DATABASE_NAME: &str = "twitter_monitor";

/// Database name used by the older "hooshyar" deployment
pub const LEGACY_DATABASE_NAME: &str = "hooshyar";

/// Every collection the application expects, in provisioning order.
pub const COLLECTION_NAMES: [&str; 7] = [
    TWEET_COLLECTION_NAME,
    KEYWORD_COLLECTION_NAME,
    SYSTEM_SETTING_COLLECTION_NAME,
    MIGRATION_COLLECTION_NAME,
    EXECUTION_LOG_COLLECTION_NAME,
    SYSTEM_STAT_COLLECTION_NAME,
    SCHEDULER_JOB_COLLECTION_NAME,
];
