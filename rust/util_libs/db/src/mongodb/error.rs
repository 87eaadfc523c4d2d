use mongodb::error::{Error as DriverError, ErrorKind};
use thiserror::Error;

/// Server error code returned when SCRAM credentials are rejected.
pub const AUTHENTICATION_FAILED_CODE: i32 = 18;
/// An index with the same name exists with different options.
pub const INDEX_OPTIONS_CONFLICT_CODE: i32 = 85;
/// An index with the same name exists with a different key pattern.
pub const INDEX_KEY_SPECS_CONFLICT_CODE: i32 = 86;
/// The targeted collection does not exist.
pub const NAMESPACE_NOT_FOUND_CODE: i32 = 26;
/// `dropIndexes` named an index the collection does not have.
pub const INDEX_NOT_FOUND_CODE: i32 = 27;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Conflicting index definition on collection `{collection}`: {message}")]
    IndexConflict { collection: String, message: String },

    #[error("MongoDB {operation} operation failed: {source}")]
    Database {
        operation: String,
        #[source]
        source: DriverError,
    },

    #[error("Failed to serialize document: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a server command error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerCodeClass {
    Authentication,
    IndexConflict,
    /// The collection or index an operation targets is already gone.
    NotFound,
    Other,
}

impl ServerCodeClass {
    pub fn from_code(code: i32) -> Self {
        match code {
            AUTHENTICATION_FAILED_CODE => Self::Authentication,
            INDEX_OPTIONS_CONFLICT_CODE | INDEX_KEY_SPECS_CONFLICT_CODE => Self::IndexConflict,
            NAMESPACE_NOT_FOUND_CODE | INDEX_NOT_FOUND_CODE => Self::NotFound,
            _ => Self::Other,
        }
    }
}

impl DbError {
    /// Maps a driver error onto the bootstrap taxonomy.
    ///
    /// `collection` names the collection the operation targeted, if any, and is
    /// carried into [`DbError::IndexConflict`].
    pub fn from_driver(operation: &str, collection: Option<&str>, error: DriverError) -> Self {
        let classified = match error.kind.as_ref() {
            ErrorKind::Authentication { message, .. } => {
                Some(DbError::Authentication(message.clone()))
            }
            ErrorKind::Command(command) => match ServerCodeClass::from_code(command.code) {
                ServerCodeClass::Authentication => {
                    Some(DbError::Authentication(command.message.clone()))
                }
                ServerCodeClass::IndexConflict => Some(DbError::IndexConflict {
                    collection: collection.unwrap_or_default().to_string(),
                    message: command.message.clone(),
                }),
                ServerCodeClass::NotFound | ServerCodeClass::Other => None,
            },
            _ => None,
        };

        let mapped = classified.unwrap_or_else(|| DbError::Database {
            operation: operation.to_string(),
            source: error,
        });
        log::debug!("{}", mapped);
        mapped
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, DbError::Authentication(_))
    }

    pub fn is_index_conflict(&self) -> bool {
        matches!(self, DbError::IndexConflict { .. })
    }

    /// Whether the underlying driver error is a duplicate-key write failure (code 11000).
    pub fn is_duplicate_key(&self) -> bool {
        match self {
            DbError::Database { source, .. } => is_duplicate_key_error(source),
            _ => false,
        }
    }
}

/// Whether `error` is a server reply saying the targeted collection or index
/// does not exist.
pub fn is_not_found_error(error: &DriverError) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Command(command) => {
            ServerCodeClass::from_code(command.code) == ServerCodeClass::NotFound
        }
        _ => false,
    }
}

pub(crate) fn is_duplicate_key_error(error: &DriverError) -> bool {
    use mongodb::error::WriteFailure;

    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command) => command.code == 11000,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_server_codes() {
        assert_eq!(ServerCodeClass::from_code(18), ServerCodeClass::Authentication);
        assert_eq!(ServerCodeClass::from_code(85), ServerCodeClass::IndexConflict);
        assert_eq!(ServerCodeClass::from_code(86), ServerCodeClass::IndexConflict);
        assert_eq!(ServerCodeClass::from_code(26), ServerCodeClass::NotFound);
        assert_eq!(ServerCodeClass::from_code(27), ServerCodeClass::NotFound);
        assert_eq!(ServerCodeClass::from_code(11000), ServerCodeClass::Other);
        assert_eq!(ServerCodeClass::from_code(13), ServerCodeClass::Other);
    }

    #[test]
    fn index_conflict_message_names_collection() {
        let err = DbError::IndexConflict {
            collection: "tweets".to_string(),
            message: "Index already exists with a different name".to_string(),
        };
        assert!(err.is_index_conflict());
        assert!(!err.is_authentication());
        assert!(err.to_string().contains("`tweets`"));
    }
}
