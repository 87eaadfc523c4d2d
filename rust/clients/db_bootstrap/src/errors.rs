use db_utils::mongodb::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error("Failed to write status output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Migration {version} failed: {reason}")]
    Migration { version: String, reason: String },
}

impl BootstrapError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, BootstrapError::Database(e) if e.is_authentication())
    }

    pub fn is_index_conflict(&self) -> bool {
        matches!(self, BootstrapError::Database(e) if e.is_index_conflict())
    }
}
