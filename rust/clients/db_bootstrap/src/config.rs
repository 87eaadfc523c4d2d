use crate::{
    cli::{ConnectionArgs, InitArgs, Preset},
    errors::BootstrapError,
};

use db_utils::mongodb::{
    connect_with_credentials, AdminCredentials, DEFAULT_AUTH_SOURCE, DEFAULT_MONGODB_URL,
};
use db_utils::schemas::{DATABASE_NAME, LEGACY_DATABASE_NAME};
use mongodb::Client;

pub const DEFAULT_ADMIN_USER: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "password";
pub const DEFAULT_APP_USER: &str = "app_user";
pub const DEFAULT_APP_PASSWORD: &str = "app_password";

// Characters MongoDB refuses in database names.
const FORBIDDEN_DB_NAME_CHARS: [char; 7] = ['/', '\\', '.', ' ', '"', '$', '\0'];

/// Where and as whom to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub mongo_uri: String,
    pub credentials: AdminCredentials,
    pub db_name: String,
    pub preset: Preset,
}

impl ConnectionConfig {
    /// Resolves flags/environment against the preset's defaults.
    ///
    /// The `hooshyar` preset pins credentials and database name; values given
    /// for those are ignored with a warning.
    pub fn from_args(args: &ConnectionArgs) -> Result<Self, BootstrapError> {
        let mongo_uri = args
            .mongo_uri
            .clone()
            .unwrap_or_else(|| DEFAULT_MONGODB_URL.to_string());

        let (admin_user, admin_password, db_name) = match args.preset {
            Preset::TwitterMonitor => (
                args.admin_user
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ADMIN_USER.to_string()),
                args.admin_password
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
                args.database
                    .clone()
                    .unwrap_or_else(|| DATABASE_NAME.to_string()),
            ),
            Preset::Hooshyar => {
                let overridden = args.admin_user.is_some()
                    || args.admin_password.is_some()
                    || args.database.is_some();
                if overridden {
                    log::warn!(
                        "The {} preset pins credentials and database; ignoring supplied values",
                        args.preset
                    );
                }
                (
                    DEFAULT_ADMIN_USER.to_string(),
                    DEFAULT_ADMIN_PASSWORD.to_string(),
                    LEGACY_DATABASE_NAME.to_string(),
                )
            }
        };

        validate_db_name(&db_name)?;
        if admin_user.is_empty() {
            return Err(BootstrapError::Configuration(
                "administrator username must not be empty".to_string(),
            ));
        }

        let mut credentials = AdminCredentials::new(admin_user, admin_password);
        credentials.source = args
            .auth_source
            .clone()
            .unwrap_or_else(|| DEFAULT_AUTH_SOURCE.to_string());

        Ok(Self {
            mongo_uri,
            credentials,
            db_name,
            preset: args.preset,
        })
    }

    pub async fn connect(&self) -> Result<Client, BootstrapError> {
        Ok(connect_with_credentials(&self.mongo_uri, &self.credentials).await?)
    }
}

/// Everything the bootstrap procedure needs, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub connection: ConnectionConfig,
    pub app_user: String,
    pub app_password: String,
    pub include_extended_indexes: bool,
}

impl BootstrapConfig {
    pub fn new(connection: ConnectionConfig, args: &InitArgs) -> Result<Self, BootstrapError> {
        let app_user = if args.app_user.is_empty() {
            DEFAULT_APP_USER.to_string()
        } else {
            args.app_user.clone()
        };
        let app_password = args
            .app_password
            .clone()
            .unwrap_or_else(|| DEFAULT_APP_PASSWORD.to_string());
        if app_password.is_empty() {
            return Err(BootstrapError::Configuration(
                "application password must not be empty".to_string(),
            ));
        }

        let include_extended_indexes = args
            .extended_indexes
            .unwrap_or(connection.preset == Preset::TwitterMonitor);

        Ok(Self {
            connection,
            app_user,
            app_password,
            include_extended_indexes,
        })
    }

    pub fn db_name(&self) -> &str {
        &self.connection.db_name
    }
}

fn validate_db_name(name: &str) -> Result<(), BootstrapError> {
    if name.is_empty() {
        return Err(BootstrapError::Configuration(
            "database name must not be empty".to_string(),
        ));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_DB_NAME_CHARS.contains(c)) {
        return Err(BootstrapError::Configuration(format!(
            "database name {name:?} contains forbidden character {c:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twitter_monitor_defaults() {
        let config = ConnectionConfig::from_args(&ConnectionArgs::default()).unwrap();
        assert_eq!(config.mongo_uri, "mongodb://127.0.0.1:27017");
        assert_eq!(config.credentials, AdminCredentials::new("admin", "password"));
        assert_eq!(config.db_name, "twitter_monitor");

        let bootstrap = BootstrapConfig::new(config, &InitArgs::default()).unwrap();
        assert_eq!(bootstrap.app_user, "app_user");
        assert_eq!(bootstrap.app_password, "app_password");
        assert!(bootstrap.include_extended_indexes);
    }

    #[test]
    fn twitter_monitor_takes_supplied_values() {
        let args = ConnectionArgs {
            admin_user: Some("root".to_string()),
            admin_password: Some("hunter2".to_string()),
            database: Some("monitor_staging".to_string()),
            auth_source: Some("users".to_string()),
            ..Default::default()
        };
        let config = ConnectionConfig::from_args(&args).unwrap();
        assert_eq!(config.credentials.username, "root");
        assert_eq!(config.credentials.password, "hunter2");
        assert_eq!(config.credentials.source, "users");
        assert_eq!(config.db_name, "monitor_staging");
    }

    #[test]
    fn hooshyar_pins_credentials_and_base_indexes() {
        let args = ConnectionArgs {
            admin_user: Some("root".to_string()),
            database: Some("twitter_monitor".to_string()),
            preset: Preset::Hooshyar,
            ..Default::default()
        };
        let config = ConnectionConfig::from_args(&args).unwrap();
        assert_eq!(config.credentials, AdminCredentials::new("admin", "password"));
        assert_eq!(config.db_name, "hooshyar");

        let bootstrap = BootstrapConfig::new(config.clone(), &InitArgs::default()).unwrap();
        assert!(!bootstrap.include_extended_indexes);

        let forced = InitArgs {
            extended_indexes: Some(true),
            ..Default::default()
        };
        assert!(BootstrapConfig::new(config, &forced).unwrap().include_extended_indexes);
    }

    #[test]
    fn rejects_invalid_database_names() {
        for name in ["", "tweets.db", "a b", "x$y"] {
            let args = ConnectionArgs {
                database: Some(name.to_string()),
                ..Default::default()
            };
            assert!(matches!(
                ConnectionConfig::from_args(&args),
                Err(BootstrapError::Configuration(_))
            ));
        }
    }

    #[test]
    fn rejects_empty_app_password() {
        let config = ConnectionConfig::from_args(&ConnectionArgs::default()).unwrap();
        let args = InitArgs {
            app_password: Some(String::new()),
            ..Default::default()
        };
        assert!(BootstrapConfig::new(config, &args).is_err());
    }
}
