use crate::mongodb::traits::IntoIndexes;

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

pub const TWEET_COLLECTION_NAME: &str = "tweets";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Tweet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    /// Twitter's own identifier, unique across the collection
    pub tweet_id: String,
    pub text: String,
    pub created_at: Option<DateTime>,
    pub lang: String,
    pub user_id: String,
    pub user_screen_name: String,
    pub user_name: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Tracked keywords that caused this tweet to be extracted
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub retweet_count: i64,
    #[serde(default)]
    pub favorite_count: i64,
    #[serde(default)]
    pub importance_score: f64,
    #[serde(default)]
    pub is_processed: bool,
}

impl IntoIndexes for Tweet {
    fn into_indices(self) -> anyhow::Result<Vec<(Document, Option<IndexOptions>)>> {
        let unique = IndexOptions::builder().unique(true).build();
        // Tweets are mostly Persian; stemming by the server's detected language would mangle them.
        let full_text = IndexOptions::builder()
            .default_language("none".to_string())
            .build();

        Ok(vec![
            (doc! { "tweet_id": 1 }, Some(unique)),
            (doc! { "created_at": -1 }, None),
            (doc! { "keywords": 1 }, None),
            (doc! { "user_id": 1 }, None),
            (doc! { "importance_score": -1 }, None),
            (doc! { "text": "text" }, Some(full_text)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tweet_id_is_the_only_unique_index() {
        let indices = Tweet::default().into_indices().unwrap();
        let unique: Vec<_> = indices
            .iter()
            .filter(|(_, opts)| opts.as_ref().and_then(|o| o.unique).unwrap_or(false))
            .map(|(keys, _)| keys.clone())
            .collect();
        assert_eq!(unique, vec![doc! { "tweet_id": 1 }]);
    }

    #[test]
    fn text_index_disables_language_detection() {
        let indices = Tweet::default().into_indices().unwrap();
        let (_, opts) = indices
            .iter()
            .find(|(keys, _)| keys.get_str("text").is_ok())
            .expect("text index");
        assert_eq!(
            opts.as_ref().and_then(|o| o.default_language.as_deref()),
            Some("none")
        );
    }
}
