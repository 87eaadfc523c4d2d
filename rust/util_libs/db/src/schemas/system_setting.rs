use crate::mongodb::{
    api::MongoDbAPI, collection::MongoCollection, error::DbError, traits::IntoIndexes,
};

use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use mongodb::{options::IndexOptions, Database};
use serde::{Deserialize, Serialize};

pub const SYSTEM_SETTING_COLLECTION_NAME: &str = "system_settings";

/// Runtime configuration row read by the application, keyed by `key`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemSetting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub key: String,
    pub value: Bson,
    pub description: String,
    pub last_updated: DateTime,
}

impl Default for SystemSetting {
    fn default() -> Self {
        Self {
            _id: None,
            key: String::new(),
            value: Bson::Null,
            description: String::new(),
            last_updated: DateTime::now(),
        }
    }
}

impl SystemSetting {
    pub fn new(key: &str, value: impl Into<Bson>, description: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
            description: description.to_string(),
            ..Default::default()
        }
    }
}

impl IntoIndexes for SystemSetting {
    fn into_indices(self) -> anyhow::Result<Vec<(Document, Option<IndexOptions>)>> {
        let key_index_options = IndexOptions::builder().unique(true).build();
        Ok(vec![(doc! { "key": 1 }, Some(key_index_options))])
    }
}

/// Keys owned by provisioning. Rows with any other key belong to operators.
pub const DEFAULT_SETTING_KEYS: [&str; 4] = [
    "extraction_enabled",
    "max_extraction_per_hour",
    "default_language",
    "system_initialized",
];

/// The default settings, each stamped with the current time.
pub fn default_settings() -> Vec<SystemSetting> {
    vec![
        SystemSetting::new(
            "extraction_enabled",
            true,
            "فعال بودن استخراج خودکار توییت‌ها",
        ),
        SystemSetting::new(
            "max_extraction_per_hour",
            5_i32,
            "حداکثر تعداد استخراج در هر ساعت",
        ),
        SystemSetting::new(
            "default_language",
            "fa",
            "زبان پیش‌فرض برای استخراج توییت‌ها",
        ),
        SystemSetting::new(
            "system_initialized",
            true,
            "وضعیت راه‌اندازی اولیه سیستم",
        ),
    ]
}

/// Create-or-replace every default setting by `key`, refreshing `last_updated`.
///
/// Runs unconditionally; rows whose key is not a default key are never touched.
///
/// # Returns
///
/// The number of settings written
pub async fn upsert_default_settings(db: &Database) -> Result<usize, DbError> {
    let settings = MongoCollection::<SystemSetting>::open(db, SYSTEM_SETTING_COLLECTION_NAME);
    let defaults = default_settings();

    for setting in defaults.iter() {
        let result = settings
            .upsert_one_within(doc! { "key": &setting.key }, setting)
            .await?;
        log::debug!(
            "Upserted setting {} (matched: {}, upserted: {})",
            setting.key,
            result.matched_count,
            result.upserted_id.is_some()
        );
    }

    log::info!("Upserted {} default settings", defaults.len());
    Ok(defaults.len())
}
