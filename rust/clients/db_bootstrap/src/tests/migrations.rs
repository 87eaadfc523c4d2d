use super::harness::{config, init_logging, mongod_with_admin, ADMIN_PASSWORD};
use crate::{bootstrap, cli::Preset, errors::BootstrapError, migrations::MigrationManager};

use anyhow::Result;
use bson::{doc, Document};
use mongodb::Database;
use serial_test::serial;

async fn index_names(db: &Database, collection: &str) -> Result<Vec<String>> {
    Ok(db
        .collection::<Document>(collection)
        .list_index_names()
        .await?)
}

fn versions(outcomes: &[crate::migrations::MigrationOutcome]) -> Vec<&str> {
    outcomes.iter().map(|o| o.version.as_str()).collect()
}

#[tokio::test]
#[serial]
async fn test_migrate_applies_pending_in_order_once() -> Result<()> {
    init_logging();

    let (_mongod, client) = mongod_with_admin(ADMIN_PASSWORD).await?;
    let db = client.database("twitter_monitor");
    let manager = MigrationManager::with_builtin(db.clone());

    let first = manager.migrate(Some("001")).await?;
    assert_eq!(versions(&first), vec!["001"]);
    assert!(!index_names(&db, "tweets")
        .await?
        .contains(&"created_at_-1_importance_score_-1".to_string()));

    let rest = manager.migrate(None).await?;
    assert_eq!(versions(&rest), vec!["002"]);
    assert!(manager.migrate(None).await?.is_empty());

    let tweet_indexes = index_names(&db, "tweets").await?;
    assert!(tweet_indexes.contains(&"created_at_-1_importance_score_-1".to_string()));
    assert!(tweet_indexes.contains(&"user_screen_name_1_created_at_-1".to_string()));
    assert!(index_names(&db, "keywords")
        .await?
        .contains(&"is_active_1_priority_1".to_string()));

    let status = manager.status().await?;
    assert!(status.iter().all(|s| s.applied && s.applied_at.is_some()));
    assert_eq!(
        db.collection::<Document>("migrations")
            .count_documents(doc! {})
            .await?,
        2
    );
    assert_eq!(
        db.collection::<Document>("system_settings")
            .count_documents(doc! {})
            .await?,
        4
    );

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_rollback_keeps_target_applied() -> Result<()> {
    init_logging();

    let (_mongod, client) = mongod_with_admin(ADMIN_PASSWORD).await?;
    let db = client.database("twitter_monitor");
    let manager = MigrationManager::with_builtin(db.clone());
    manager.migrate(None).await?;

    let reverted = manager.rollback(Some("001")).await?;
    assert_eq!(versions(&reverted), vec!["002"]);

    let tweet_indexes = index_names(&db, "tweets").await?;
    assert!(!tweet_indexes.contains(&"created_at_-1_importance_score_-1".to_string()));
    assert!(tweet_indexes.contains(&"tweet_id_1".to_string()));

    let status = manager.status().await?;
    assert_eq!(
        status.iter().map(|s| s.applied).collect::<Vec<_>>(),
        vec![true, false]
    );

    let reverted = manager.rollback(None).await?;
    assert_eq!(versions(&reverted), vec!["001"]);
    let remaining = db.list_collection_names().await?;
    assert!(!remaining.iter().any(|c| c == "tweets"));
    assert!(manager.status().await?.iter().all(|s| !s.applied));

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_unknown_target_changes_nothing() -> Result<()> {
    init_logging();

    let (_mongod, client) = mongod_with_admin(ADMIN_PASSWORD).await?;
    let db = client.database("twitter_monitor");
    let manager = MigrationManager::with_builtin(db.clone());

    let err = manager
        .migrate(Some("099"))
        .await
        .expect_err("unknown version must be rejected");
    assert!(matches!(err, BootstrapError::Configuration(_)));
    assert!(manager.status().await?.iter().all(|s| !s.applied));

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_migrate_after_bootstrap_reuses_indexes() -> Result<()> {
    init_logging();

    let (_mongod, client) = mongod_with_admin(ADMIN_PASSWORD).await?;
    bootstrap::run(&client, &config(Preset::TwitterMonitor), &mut Vec::new()).await?;
    let db = client.database("twitter_monitor");
    let before = index_names(&db, "tweets").await?.len();

    let manager = MigrationManager::with_builtin(db.clone());
    let applied = manager.migrate(None).await?;
    assert_eq!(versions(&applied), vec!["001", "002"]);
    assert_eq!(index_names(&db, "tweets").await?.len(), before + 2);

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_rollback_completes_when_index_already_dropped() -> Result<()> {
    init_logging();

    let (_mongod, client) = mongod_with_admin(ADMIN_PASSWORD).await?;
    let db = client.database("twitter_monitor");
    let manager = MigrationManager::with_builtin(db.clone());
    manager.migrate(None).await?;

    // removed by hand between migrate and rollback
    db.collection::<Document>("tweets")
        .drop_index("created_at_-1_importance_score_-1")
        .await?;

    let reverted = manager.rollback(Some("001")).await?;
    assert_eq!(versions(&reverted), vec!["002"]);

    let tweet_indexes = index_names(&db, "tweets").await?;
    assert!(!tweet_indexes.contains(&"user_screen_name_1_created_at_-1".to_string()));
    assert!(!index_names(&db, "keywords")
        .await?
        .contains(&"is_active_1_priority_1".to_string()));
    assert_eq!(
        manager
            .status()
            .await?
            .iter()
            .map(|s| s.applied)
            .collect::<Vec<_>>(),
        vec![true, false]
    );

    Ok(())
}
