//! Clap Derive structs/definitions that make up the `tweetmon-db` command line.
//! Every connection flag can also be supplied via the environment, which is how
//! the container entrypoint drives it.

use clap::{Args, Parser, Subcommand, ValueEnum};
use strum::{AsRefStr, Display};

#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "Provisions the Twitter Monitor MongoDB database: application user, collections, indexes, default settings and schema migrations"
)]
pub struct Root {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Which historical deployment the run should reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, AsRefStr, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Preset {
    /// Credentials and database from flags/environment; full index set.
    #[default]
    TwitterMonitor,
    /// Fixed admin/password credentials on the `hooshyar` database; base index set only.
    Hooshyar,
}

#[derive(Args, Clone, Default)]
pub struct ConnectionArgs {
    #[arg(
        long,
        global = true,
        env = "MONGO_URI",
        help = "MongoDB connection string [default: mongodb://127.0.0.1:27017]"
    )]
    pub mongo_uri: Option<String>,

    #[arg(
        long,
        global = true,
        env = "MONGO_INITDB_ROOT_USERNAME",
        help = "administrator username [default: admin]"
    )]
    pub admin_user: Option<String>,

    #[arg(
        long,
        global = true,
        env = "MONGO_INITDB_ROOT_PASSWORD",
        hide_env_values = true,
        help = "administrator password [default: password]"
    )]
    pub admin_password: Option<String>,

    #[arg(
        long,
        global = true,
        env = "MONGO_INITDB_DATABASE",
        help = "target database [default: twitter_monitor]"
    )]
    pub database: Option<String>,

    #[arg(
        long,
        global = true,
        env = "MONGO_AUTH_SOURCE",
        help = "database holding the administrator [default: admin]"
    )]
    pub auth_source: Option<String>,

    #[arg(
        long,
        global = true,
        env = "MONGO_INIT_PRESET",
        value_enum,
        default_value_t = Preset::TwitterMonitor
    )]
    pub preset: Preset,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Provision the application user, collections, indexes and default settings.
    Init(InitArgs),
    /// Apply pending schema migrations.
    Migrate {
        /// Stop after this version (inclusive).
        #[arg(long)]
        target: Option<String>,
    },
    /// Revert applied schema migrations, newest first.
    Rollback {
        /// Stop before this version; it stays applied.
        #[arg(long)]
        target: Option<String>,
    },
    /// List known migrations and whether they are applied.
    Migrations,
    /// Print storage statistics of the target database as JSON.
    Stats,
}

#[derive(Args, Clone, Debug, Default)]
pub struct InitArgs {
    #[arg(long, default_value = "app_user", help = "name of the application user")]
    pub app_user: String,

    #[arg(
        long,
        env = "MONGO_APP_PASSWORD",
        hide_env_values = true,
        help = "password given to a newly created application user [default: app_password]"
    )]
    pub app_password: Option<String>,

    #[arg(
        long,
        env = "MONGO_INIT_EXTENDED_INDEXES",
        help = "also index system_settings, execution_logs, migrations and system_stats (defaults to the preset's choice)"
    )]
    pub extended_indexes: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use db_utils::mongodb::AdminCredentials;
    use serial_test::serial;

    const CONNECTION_ENV: [(&str, &str); 3] = [
        ("MONGO_INITDB_ROOT_USERNAME", "root"),
        ("MONGO_INITDB_ROOT_PASSWORD", "hunter2"),
        ("MONGO_INITDB_DATABASE", "monitor_staging"),
    ];

    #[test]
    #[serial]
    fn parses_init_with_defaults() {
        let root = Root::try_parse_from(["tweetmon-db", "init"]).unwrap();
        assert_eq!(root.connection.preset, Preset::TwitterMonitor);
        match root.command {
            Command::Init(args) => {
                assert_eq!(args.app_user, "app_user");
                assert_eq!(args.extended_indexes, None);
            }
            _ => panic!("expected init"),
        }
    }

    #[test]
    #[serial]
    fn parses_global_flags_after_subcommand() {
        let root = Root::try_parse_from([
            "tweetmon-db",
            "migrate",
            "--target",
            "001",
            "--preset",
            "hooshyar",
            "--database",
            "scratch",
        ])
        .unwrap();
        assert_eq!(root.connection.preset, Preset::Hooshyar);
        assert_eq!(root.connection.database.as_deref(), Some("scratch"));
        assert!(matches!(root.command, Command::Migrate { target: Some(ref t) } if t == "001"));
    }

    #[test]
    fn parses_extended_index_override() {
        let root = Root::try_parse_from(["tweetmon-db", "init", "--extended-indexes", "false"])
            .unwrap();
        assert!(matches!(
            root.command,
            Command::Init(InitArgs { extended_indexes: Some(false), .. })
        ));
    }

    #[test]
    fn preset_names_are_kebab_case() {
        assert_eq!(Preset::TwitterMonitor.as_ref(), "twitter-monitor");
        assert_eq!(Preset::Hooshyar.to_string(), "hooshyar");
    }

    #[test]
    #[serial]
    fn connection_falls_back_to_container_environment() {
        for (key, value) in CONNECTION_ENV {
            std::env::set_var(key, value);
        }

        let root = Root::try_parse_from(["tweetmon-db", "init"]).unwrap();
        let config = ConnectionConfig::from_args(&root.connection).unwrap();
        assert_eq!(config.credentials, AdminCredentials::new("root", "hunter2"));
        assert_eq!(config.db_name, "monitor_staging");

        let root = Root::try_parse_from(["tweetmon-db", "init", "--preset", "hooshyar"])
            .unwrap();
        let pinned = ConnectionConfig::from_args(&root.connection).unwrap();
        assert_eq!(pinned.credentials, AdminCredentials::new("admin", "password"));
        assert_eq!(pinned.db_name, "hooshyar");

        for (key, _) in CONNECTION_ENV {
            std::env::remove_var(key);
        }
    }
}
