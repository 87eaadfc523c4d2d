use crate::mongodb::traits::IntoIndexes;

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub const EXECUTION_LOG_COLLECTION_NAME: &str = "execution_logs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionStatus {
    #[default]
    Running,
    Success,
    Error,
}

/// One run of a scheduled background task.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExecutionLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub task_name: String,
    pub start_time: Option<DateTime>,
    pub end_time: Option<DateTime>,
    pub status: ExecutionStatus,
    /// Task-specific result payload
    pub details: Option<Document>,
    pub error: Option<String>,
}

impl IntoIndexes for ExecutionLog {
    fn into_indices(self) -> anyhow::Result<Vec<(Document, Option<IndexOptions>)>> {
        Ok(vec![
            (doc! { "task_name": 1 }, None),
            (doc! { "start_time": -1 }, None),
            (doc! { "status": 1 }, None),
        ])
    }
}
