//! One-shot provisioning of the Twitter Monitor database.
//!
//! Every step is safe to re-run: users and collections are only created when
//! missing, index creation is a no-op for identical definitions, and the default
//! settings are upserted. The first error aborts the remaining steps; nothing
//! already provisioned is rolled back.

use crate::{
    config::BootstrapConfig,
    errors::BootstrapError,
    report::{self, Provisioned},
};

use bson::{doc, Bson};
use db_utils::mongodb::{ping, DbError, IntoIndexes, MongoCollection};
use db_utils::schemas::{
    self, ExecutionLog, Keyword, MigrationRecord, SystemSetting, SystemStat, Tweet,
    COLLECTION_NAMES,
};
use mongodb::{Client, Database};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, io::Write};

/// The only role the application user ever receives, scoped to the target database.
pub const APP_USER_ROLE: &str = "readWrite";

/// A `{role, db}` grant as reported by `usersInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub role: String,
    pub db: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapSummary {
    pub app_user: Provisioned,
    pub collections: Vec<(String, Provisioned)>,
    /// Collection name and number of indices requested on it
    pub indexes: Vec<(String, usize)>,
    pub settings: usize,
}

/// Runs every provisioning step in order, writing status lines to `out`.
pub async fn run(
    client: &Client,
    config: &BootstrapConfig,
    out: &mut impl Write,
) -> Result<BootstrapSummary, BootstrapError> {
    authenticate(client).await?;

    let db = client.database(config.db_name());
    log::info!("Provisioning database {}", db.name());

    let app_user = ensure_app_user(&db, &config.app_user, &config.app_password).await?;
    report::user(out, &config.app_user, app_user)?;

    let collections = ensure_collections(&db).await?;
    for (name, outcome) in collections.iter() {
        report::collection(out, name, *outcome)?;
    }

    let indexes = ensure_indexes(&db, config.include_extended_indexes).await?;
    report::indexes_ready(out)?;

    let settings = schemas::upsert_default_settings(&db).await?;
    report::settings_seeded(out)?;

    report::finished(out)?;
    log::info!("Database {} provisioned", db.name());

    Ok(BootstrapSummary {
        app_user,
        collections,
        indexes,
        settings,
    })
}

/// Forces the admin authentication handshake before anything is provisioned.
pub async fn authenticate(client: &Client) -> Result<(), BootstrapError> {
    ping(client).await?;
    log::debug!("Authenticated against MongoDB");
    Ok(())
}

/// Role grants of `user` in `db`, or `None` when the user does not exist.
pub async fn user_roles(db: &Database, user: &str) -> Result<Option<Vec<RoleGrant>>, DbError> {
    let reply = db
        .run_command(doc! { "usersInfo": { "user": user, "db": db.name() } })
        .await
        .map_err(|e| DbError::from_driver("usersInfo", None, e))?;

    let Some(record) = reply
        .get_array("users")
        .ok()
        .and_then(|users| users.iter().find_map(Bson::as_document))
    else {
        return Ok(None);
    };

    let roles = record
        .get_array("roles")
        .map(|roles| {
            roles
                .iter()
                .filter_map(Bson::as_document)
                .filter_map(|grant| {
                    Some(RoleGrant {
                        role: grant.get_str("role").ok()?.to_string(),
                        db: grant.get_str("db").ok()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Some(roles))
}

/// Creates `user` with `readWrite` on `db` alone. An existing user is left as is:
/// its password and grants are authoritative.
pub async fn ensure_app_user(
    db: &Database,
    user: &str,
    password: &str,
) -> Result<Provisioned, DbError> {
    if user_roles(db, user).await?.is_some() {
        log::info!("User {} already exists in {}", user, db.name());
        return Ok(Provisioned::AlreadyExists);
    }

    db.run_command(doc! {
        "createUser": user,
        "pwd": password,
        "roles": [{ "role": APP_USER_ROLE, "db": db.name() }],
    })
    .await
    .map_err(|e| DbError::from_driver("createUser", None, e))?;

    log::info!("Created user {} with {} on {}", user, APP_USER_ROLE, db.name());
    Ok(Provisioned::Created)
}

/// Creates every collection in [`COLLECTION_NAMES`] that is missing, in order.
pub async fn ensure_collections(db: &Database) -> Result<Vec<(String, Provisioned)>, DbError> {
    let existing = db
        .list_collection_names()
        .await
        .map_err(|e| DbError::from_driver("listCollections", None, e))?;

    let mut outcomes = Vec::with_capacity(COLLECTION_NAMES.len());
    for name in COLLECTION_NAMES {
        if existing.iter().any(|c| c == name) {
            log::debug!("Collection {} already exists", name);
            outcomes.push((name.to_string(), Provisioned::AlreadyExists));
            continue;
        }

        db.create_collection(name)
            .await
            .map_err(|e| DbError::from_driver("create", Some(name), e))?;
        log::info!("Created collection {}", name);
        outcomes.push((name.to_string(), Provisioned::Created));
    }

    Ok(outcomes)
}

/// Applies the index catalogue. The extended block covers `system_settings`,
/// `execution_logs`, `migrations` and `system_stats`.
///
/// A definition that diverges from an existing index under the same generated
/// name fails with [`DbError::IndexConflict`] and aborts the remaining collections.
pub async fn ensure_indexes(
    db: &Database,
    include_extended: bool,
) -> Result<Vec<(String, usize)>, DbError> {
    let mut applied = vec![
        apply_indexes::<Tweet>(db, schemas::TWEET_COLLECTION_NAME).await?,
        apply_indexes::<Keyword>(db, schemas::KEYWORD_COLLECTION_NAME).await?,
    ];

    if include_extended {
        applied.extend([
            apply_indexes::<SystemSetting>(db, schemas::SYSTEM_SETTING_COLLECTION_NAME).await?,
            apply_indexes::<ExecutionLog>(db, schemas::EXECUTION_LOG_COLLECTION_NAME).await?,
            apply_indexes::<MigrationRecord>(db, schemas::MIGRATION_COLLECTION_NAME).await?,
            apply_indexes::<SystemStat>(db, schemas::SYSTEM_STAT_COLLECTION_NAME).await?,
        ]);
    } else {
        log::info!("Skipping extended index block");
    }

    Ok(applied)
}

async fn apply_indexes<T>(db: &Database, collection_name: &str) -> Result<(String, usize), DbError>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync + Default + Debug + IntoIndexes,
{
    let collection = MongoCollection::<T>::new(db, collection_name).await?;
    Ok((collection_name.to_string(), collection.index_count()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_sizes_per_block() {
        let base = MongoCollection::<Tweet>::schema_index_models().unwrap().len()
            + MongoCollection::<Keyword>::schema_index_models().unwrap().len();
        let extended = MongoCollection::<SystemSetting>::schema_index_models().unwrap().len()
            + MongoCollection::<ExecutionLog>::schema_index_models().unwrap().len()
            + MongoCollection::<MigrationRecord>::schema_index_models().unwrap().len()
            + MongoCollection::<SystemStat>::schema_index_models().unwrap().len();
        assert_eq!(base, 10);
        assert_eq!(extended, 7);
    }
}
