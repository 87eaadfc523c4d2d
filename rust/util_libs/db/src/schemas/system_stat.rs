use crate::mongodb::traits::IntoIndexes;

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

pub const SYSTEM_STAT_COLLECTION_NAME: &str = "system_stats";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DatabaseUsage {
    pub size_mb: f64,
    pub storage_mb: f64,
    pub collections: i64,
    pub objects: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TweetCounts {
    pub total: i64,
    pub today: i64,
    pub last_24h: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct KeywordCounts {
    pub total: i64,
    pub active: i64,
}

/// Daily snapshot written by the maintenance task; one document per `date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    /// ISO calendar date, e.g. `2024-03-01`
    pub date: String,
    pub timestamp: DateTime,
    pub database: DatabaseUsage,
    pub tweets: TweetCounts,
    pub keywords: KeywordCounts,
}

impl Default for SystemStat {
    fn default() -> Self {
        Self {
            _id: None,
            date: String::new(),
            timestamp: DateTime::now(),
            database: DatabaseUsage::default(),
            tweets: TweetCounts::default(),
            keywords: KeywordCounts::default(),
        }
    }
}

impl IntoIndexes for SystemStat {
    fn into_indices(self) -> anyhow::Result<Vec<(Document, Option<IndexOptions>)>> {
        let date_index_options = IndexOptions::builder().unique(true).build();
        Ok(vec![
            (doc! { "date": 1 }, Some(date_index_options)),
            (doc! { "timestamp": -1 }, None),
        ])
    }
}
