use crate::mongodb::traits::IntoIndexes;

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

pub const MIGRATION_COLLECTION_NAME: &str = "migrations";

/// Marker left behind by an applied schema migration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MigrationRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub version: String,
    pub description: String,
    pub applied_at: DateTime,
}

impl Default for MigrationRecord {
    fn default() -> Self {
        Self {
            _id: None,
            version: String::new(),
            description: String::new(),
            applied_at: DateTime::now(),
        }
    }
}

impl IntoIndexes for MigrationRecord {
    fn into_indices(self) -> anyhow::Result<Vec<(Document, Option<IndexOptions>)>> {
        let version_index_options = IndexOptions::builder().unique(true).build();
        Ok(vec![(doc! { "version": 1 }, Some(version_index_options))])
    }
}
