/*
 Provisioning entrypoint for the Twitter Monitor document store.

 Typically run once by the database container's init hook:
    tweetmon-db init
 and afterwards by operators for schema migrations:
    tweetmon-db migrate --target 002
*/

use anyhow::{Context, Result};
use clap::Parser;
use db_bootstrap::{
    bootstrap,
    cli::{Command, Root},
    config::{BootstrapConfig, ConnectionConfig},
    migrations::MigrationManager,
    stats,
};
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let root = Root::parse();
    let connection = ConnectionConfig::from_args(&root.connection)?;
    log::debug!(
        "Using preset {} against database {}",
        connection.preset,
        connection.db_name
    );

    let client = connection
        .connect()
        .await
        .context("configuring MongoDB client")?;
    bootstrap::authenticate(&client)
        .await
        .context("authenticating as administrator")?;
    let db = client.database(&connection.db_name);

    match root.command {
        Command::Init(args) => {
            let config = BootstrapConfig::new(connection, &args)?;
            let mut stdout = std::io::stdout();
            bootstrap::run(&client, &config, &mut stdout)
                .await
                .context("database bootstrap failed")?;
        }
        Command::Migrate { target } => {
            let manager = MigrationManager::with_builtin(db);
            let applied = manager
                .migrate(target.as_deref())
                .await
                .context("applying migrations")?;
            if applied.is_empty() {
                println!("No pending migrations.");
            }
            for migration in applied {
                println!("applied   {}  {}", migration.version, migration.description);
            }
        }
        Command::Rollback { target } => {
            let manager = MigrationManager::with_builtin(db);
            let reverted = manager
                .rollback(target.as_deref())
                .await
                .context("rolling back migrations")?;
            if reverted.is_empty() {
                println!("Nothing to roll back.");
            }
            for migration in reverted {
                println!("reverted  {}  {}", migration.version, migration.description);
            }
        }
        Command::Migrations => {
            let manager = MigrationManager::with_builtin(db);
            for status in manager.status().await.context("reading migration status")? {
                let applied_at = status
                    .applied_at
                    .map(format_applied_at)
                    .unwrap_or_else(|| "pending".to_string());
                println!("{}  {:<28}  {}", status.version, status.description, applied_at);
            }
        }
        Command::Stats => {
            let report = stats::database_stats(&db)
                .await
                .context("collecting database statistics")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn format_applied_at(at: bson::DateTime) -> String {
    at.to_chrono().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
