pub mod api;
pub mod collection;
pub mod error;
pub mod traits;

pub use api::MongoDbAPI;
pub use collection::MongoCollection;
pub use error::DbError;
pub use traits::IntoIndexes;

use bson::doc;
use mongodb::{
    options::{ClientOptions, Credential},
    Client,
};
use std::fmt;

/// Connection string used when neither `--mongo-uri` nor `MONGO_URI` is given.
pub const DEFAULT_MONGODB_URL: &str = "mongodb://127.0.0.1:27017";

/// Database that administrative principals authenticate against by default.
pub const DEFAULT_AUTH_SOURCE: &str = "admin";

/// Username/password pair of an administrative principal.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
    /// Database holding the principal's user record (usually `admin`)
    pub source: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            source: DEFAULT_AUTH_SOURCE.to_string(),
        }
    }

    fn to_credential(&self) -> Credential {
        Credential::builder()
            .username(self.username.clone())
            .password(self.password.clone())
            .source(self.source.clone())
            .build()
    }
}

// Keep the secret out of logs.
impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("source", &self.source)
            .finish()
    }
}

/// Builds a client from already-parsed options, attaching the admin credential.
///
/// No network traffic happens here; the driver authenticates lazily on the
/// first operation (see [`ping`]).
pub fn authenticated_client(
    mut options: ClientOptions,
    credentials: &AdminCredentials,
) -> Result<Client, DbError> {
    options.credential = Some(credentials.to_credential());
    Client::with_options(options).map_err(|e| DbError::from_driver("client_options", None, e))
}

/// Parses `uri` and builds a client authenticated as `credentials`.
pub async fn connect_with_credentials(
    uri: &str,
    credentials: &AdminCredentials,
) -> Result<Client, DbError> {
    log::debug!(
        "Connecting to MongoDB as {} (auth source: {})",
        credentials.username,
        credentials.source
    );
    let options = ClientOptions::parse(uri)
        .await
        .map_err(|e| DbError::from_driver("parse_uri", None, e))?;
    authenticated_client(options, credentials)
}

/// Round trip against the `admin` database. Forces the authentication handshake,
/// so rejected credentials surface here as [`DbError::Authentication`].
pub async fn ping(client: &Client) -> Result<(), DbError> {
    client
        .database(DEFAULT_AUTH_SOURCE)
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| DbError::from_driver("ping", None, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_default_to_admin_source() {
        let creds = AdminCredentials::new("admin", "password");
        assert_eq!(creds.source, "admin");
        assert_eq!(creds.username, "admin");
    }

    #[test]
    fn debug_output_hides_password() {
        let creds = AdminCredentials::new("root", "s3cret");
        let printed = format!("{creds:?}");
        assert!(printed.contains("root"));
        assert!(!printed.contains("s3cret"));
    }
}
