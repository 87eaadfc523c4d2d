use crate::mongodb::traits::IntoIndexes;

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

pub const KEYWORD_COLLECTION_NAME: &str = "keywords";

/// A search term the extractor polls Twitter for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub keyword: String,
    pub is_active: bool,
    pub description: Option<String>,
    /// 1 (highest) to 5 (lowest)
    pub priority: i32,
    pub max_tweets_per_request: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Minutes between extractions
    pub extraction_frequency: i32,
    #[serde(default)]
    pub total_tweets: i64,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
    pub last_extracted_at: Option<DateTime>,
}

impl Default for Keyword {
    fn default() -> Self {
        let now = DateTime::now();
        Self {
            _id: None,
            keyword: String::new(),
            is_active: true,
            description: None,
            priority: 1,
            max_tweets_per_request: 100,
            tags: vec![],
            extraction_frequency: 60,
            total_tweets: 0,
            created_at: Some(now),
            updated_at: Some(now),
            last_extracted_at: None,
        }
    }
}

impl IntoIndexes for Keyword {
    fn into_indices(self) -> anyhow::Result<Vec<(Document, Option<IndexOptions>)>> {
        let mut indices = vec![];

        let keyword_index_options = IndexOptions::builder().unique(true).build();
        indices.push((doc! { "keyword": 1 }, Some(keyword_index_options)));

        indices.push((doc! { "is_active": 1 }, None));
        indices.push((doc! { "priority": 1 }, None));
        indices.push((doc! { "last_extracted_at": 1 }, None));

        Ok(indices)
    }
}
