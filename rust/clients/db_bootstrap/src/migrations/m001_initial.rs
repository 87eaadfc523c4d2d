use super::Migration;

use async_trait::async_trait;
use db_utils::mongodb::{DbError, MongoCollection};
use db_utils::schemas::{self, Keyword, SystemSetting, SystemStat, Tweet};
use mongodb::Database;

/// Base indices for tweets, keywords, daily stats and settings, plus the
/// default settings rows.
pub struct InitialStructure;

const DROPPED_ON_ROLLBACK: [&str; 4] = [
    schemas::TWEET_COLLECTION_NAME,
    schemas::KEYWORD_COLLECTION_NAME,
    schemas::SYSTEM_STAT_COLLECTION_NAME,
    schemas::SYSTEM_SETTING_COLLECTION_NAME,
];

#[async_trait]
impl Migration for InitialStructure {
    fn version(&self) -> &'static str {
        "001"
    }

    fn description(&self) -> &'static str {
        "Initial database structure"
    }

    async fn up(&self, db: &Database) -> Result<(), DbError> {
        log::info!("Running initial migration");
        MongoCollection::<Tweet>::new(db, schemas::TWEET_COLLECTION_NAME).await?;
        MongoCollection::<Keyword>::new(db, schemas::KEYWORD_COLLECTION_NAME).await?;
        MongoCollection::<SystemStat>::new(db, schemas::SYSTEM_STAT_COLLECTION_NAME).await?;
        MongoCollection::<SystemSetting>::new(db, schemas::SYSTEM_SETTING_COLLECTION_NAME).await?;
        schemas::upsert_default_settings(db).await?;
        Ok(())
    }

    async fn down(&self, db: &Database) -> Result<(), DbError> {
        log::info!("Rolling back initial migration");
        for name in DROPPED_ON_ROLLBACK {
            db.collection::<bson::Document>(name)
                .drop()
                .await
                .map_err(|e| DbError::from_driver("drop", Some(name), e))?;
            log::debug!("Dropped collection {}", name);
        }
        Ok(())
    }
}
