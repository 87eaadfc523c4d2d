use crate::mongodb::traits::IntoIndexes;

use bson::{Binary, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

pub const SCHEDULER_JOB_COLLECTION_NAME: &str = "scheduler_jobs";

/// Job store row owned by the application's scheduler.
///
/// The scheduler keys jobs by its own string id and keeps the pickled job
/// state opaque, so provisioning only creates the collection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchedulerJob {
    pub _id: String,
    /// Seconds since the epoch; absent for paused jobs
    pub next_run_time: Option<f64>,
    pub job_state: Option<Binary>,
}

impl IntoIndexes for SchedulerJob {
    fn into_indices(self) -> anyhow::Result<Vec<(Document, Option<IndexOptions>)>> {
        // The scheduler manages its own `next_run_time` index.
        Ok(vec![])
    }
}
