pub mod m001_initial;
pub mod m002_compound_indexes;

use crate::errors::BootstrapError;

use async_trait::async_trait;
use bson::{doc, DateTime};
use db_utils::mongodb::{DbError, MongoCollection, MongoDbAPI};
use db_utils::schemas::{MigrationRecord, MIGRATION_COLLECTION_NAME};
use mongodb::Database;
use serde::Serialize;
use std::collections::BTreeMap;

/// A versioned, reversible schema change.
///
/// Versions are compared as strings, so they are zero-padded (`001`, `002`, ...).
#[async_trait]
pub trait Migration: Send + Sync {
    fn version(&self) -> &'static str;
    fn description(&self) -> &'static str;
    async fn up(&self, db: &Database) -> Result<(), DbError>;
    async fn down(&self, db: &Database) -> Result<(), DbError>;
}

/// Migrations shipped with this tool.
pub fn builtin() -> Vec<Box<dyn Migration>> {
    vec![
        Box::new(m001_initial::InitialStructure),
        Box::new(m002_compound_indexes::CompoundIndexes),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationStatus {
    pub version: String,
    pub description: String,
    pub applied: bool,
    pub applied_at: Option<DateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub version: String,
    pub description: String,
}

pub struct MigrationManager {
    db: Database,
    migrations: Vec<Box<dyn Migration>>,
}

impl MigrationManager {
    pub fn new(db: Database, mut migrations: Vec<Box<dyn Migration>>) -> Self {
        migrations.sort_by(|a, b| a.version().cmp(b.version()));
        Self { db, migrations }
    }

    pub fn with_builtin(db: Database) -> Self {
        Self::new(db, builtin())
    }

    pub fn versions(&self) -> Vec<&'static str> {
        self.migrations.iter().map(|m| m.version()).collect()
    }

    fn records(&self) -> MongoCollection<MigrationRecord> {
        MongoCollection::open(&self.db, MIGRATION_COLLECTION_NAME)
    }

    /// Creates the `migrations` collection with its unique `version` index if missing.
    pub async fn ensure_migration_collection(&self) -> Result<(), BootstrapError> {
        let collections = self
            .db
            .list_collection_names()
            .await
            .map_err(|e| DbError::from_driver("listCollections", None, e))?;

        if !collections.iter().any(|c| c == MIGRATION_COLLECTION_NAME) {
            self.db
                .create_collection(MIGRATION_COLLECTION_NAME)
                .await
                .map_err(|e| DbError::from_driver("create", Some(MIGRATION_COLLECTION_NAME), e))?;
            MongoCollection::<MigrationRecord>::new(&self.db, MIGRATION_COLLECTION_NAME).await?;
            log::info!("Created {} collection", MIGRATION_COLLECTION_NAME);
        }
        Ok(())
    }

    /// Applied migration records keyed by version.
    pub async fn applied(&self) -> Result<BTreeMap<String, MigrationRecord>, BootstrapError> {
        self.ensure_migration_collection().await?;
        let records = self.records().get_many_from(doc! {}).await?;
        Ok(records
            .into_iter()
            .map(|record| (record.version.clone(), record))
            .collect())
    }

    pub async fn status(&self) -> Result<Vec<MigrationStatus>, BootstrapError> {
        let applied = self.applied().await?;
        Ok(self
            .migrations
            .iter()
            .map(|m| {
                let record = applied.get(m.version());
                MigrationStatus {
                    version: m.version().to_string(),
                    description: m.description().to_string(),
                    applied: record.is_some(),
                    applied_at: record.map(|r| r.applied_at),
                }
            })
            .collect())
    }

    /// Applies pending migrations in ascending order, up to and including `target`.
    pub async fn migrate(
        &self,
        target: Option<&str>,
    ) -> Result<Vec<MigrationOutcome>, BootstrapError> {
        let upto = upper_bound(&self.versions(), target, self.migrations.len())?;
        let applied = self.applied().await?;
        let records = self.records();
        let mut outcomes = vec![];

        for migration in self.migrations[..upto].iter() {
            if applied.contains_key(migration.version()) {
                continue;
            }

            log::info!(
                "Applying migration {}: {}",
                migration.version(),
                migration.description()
            );
            migration
                .up(&self.db)
                .await
                .map_err(|e| migration_error(migration.as_ref(), e))?;

            records
                .insert_one_into(MigrationRecord {
                    version: migration.version().to_string(),
                    description: migration.description().to_string(),
                    applied_at: DateTime::now(),
                    ..Default::default()
                })
                .await?;

            log::info!("Migration {} applied successfully", migration.version());
            outcomes.push(outcome(migration.as_ref()));
        }

        Ok(outcomes)
    }

    /// Reverts applied migrations in descending order, stopping before `target`,
    /// which stays applied. Without a target everything is reverted.
    pub async fn rollback(
        &self,
        target: Option<&str>,
    ) -> Result<Vec<MigrationOutcome>, BootstrapError> {
        let keep = upper_bound(&self.versions(), target, 0)?;
        let applied = self.applied().await?;
        let records = self.records();
        let mut outcomes = vec![];

        for migration in self.migrations[keep..].iter().rev() {
            if !applied.contains_key(migration.version()) {
                continue;
            }

            log::info!(
                "Rolling back migration {}: {}",
                migration.version(),
                migration.description()
            );
            migration
                .down(&self.db)
                .await
                .map_err(|e| migration_error(migration.as_ref(), e))?;

            records
                .delete_one_from(doc! { "version": migration.version() })
                .await?;

            log::info!("Migration {} rolled back successfully", migration.version());
            outcomes.push(outcome(migration.as_ref()));
        }

        Ok(outcomes)
    }
}

/// Number of leading migrations covered by `target` (inclusive), or `default`
/// when no target is given.
fn upper_bound(
    versions: &[&str],
    target: Option<&str>,
    default: usize,
) -> Result<usize, BootstrapError> {
    match target {
        None => Ok(default),
        Some(target) => versions
            .iter()
            .position(|v| *v == target)
            .map(|i| i + 1)
            .ok_or_else(|| {
                BootstrapError::Configuration(format!(
                    "unknown migration version {target:?} (known: {})",
                    versions.join(", ")
                ))
            }),
    }
}

fn migration_error(migration: &dyn Migration, error: DbError) -> BootstrapError {
    log::error!("Migration {} failed: {}", migration.version(), error);
    BootstrapError::Migration {
        version: migration.version().to_string(),
        reason: error.to_string(),
    }
}

fn outcome(migration: &dyn Migration) -> MigrationOutcome {
    MigrationOutcome {
        version: migration.version().to_string(),
        description: migration.description().to_string(),
    }
}
