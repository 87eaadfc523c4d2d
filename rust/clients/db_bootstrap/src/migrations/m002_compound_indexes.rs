use super::Migration;

use async_trait::async_trait;
use bson::{doc, Document};
use db_utils::mongodb::{collection::index_model, error::is_not_found_error, DbError};
use db_utils::schemas::{KEYWORD_COLLECTION_NAME, TWEET_COLLECTION_NAME};
use mongodb::Database;

/// Compound indices backing the dashboard's most common queries.
pub struct CompoundIndexes;

/// (collection, key pattern, server-generated name)
fn compound_indices() -> Vec<(&'static str, Document, &'static str)> {
    vec![
        (
            TWEET_COLLECTION_NAME,
            doc! { "created_at": -1, "importance_score": -1 },
            "created_at_-1_importance_score_-1",
        ),
        (
            TWEET_COLLECTION_NAME,
            doc! { "user_screen_name": 1, "created_at": -1 },
            "user_screen_name_1_created_at_-1",
        ),
        (
            KEYWORD_COLLECTION_NAME,
            doc! { "is_active": 1, "priority": 1 },
            "is_active_1_priority_1",
        ),
    ]
}

#[async_trait]
impl Migration for CompoundIndexes {
    fn version(&self) -> &'static str {
        "002"
    }

    fn description(&self) -> &'static str {
        "Compound query indexes"
    }

    async fn up(&self, db: &Database) -> Result<(), DbError> {
        for (collection, keys, _) in compound_indices() {
            db.collection::<Document>(collection)
                .create_index(index_model(keys, None))
                .await
                .map_err(|e| DbError::from_driver("createIndexes", Some(collection), e))?;
        }
        Ok(())
    }

    // An index (or collection) that is already gone counts as dropped, so an
    // interrupted rollback can be resumed.
    async fn down(&self, db: &Database) -> Result<(), DbError> {
        for (collection, _, name) in compound_indices() {
            match db.collection::<Document>(collection).drop_index(name).await {
                Ok(()) => log::debug!("Dropped index {} on {}", name, collection),
                Err(e) if is_not_found_error(&e) => {
                    log::warn!("Index {} on {} already absent", name, collection)
                }
                Err(e) => return Err(DbError::from_driver("dropIndexes", Some(collection), e)),
            }
        }
        Ok(())
    }
}
