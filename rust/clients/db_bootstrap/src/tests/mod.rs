#[cfg(feature = "tests_integration_mongodb")]
pub mod migrations;

#[cfg(feature = "tests_integration_mongodb")]
pub(crate) mod harness {
    use crate::{
        cli::{ConnectionArgs, InitArgs, Preset},
        config::{BootstrapConfig, ConnectionConfig},
    };
    use db_utils::mongodb::{authenticated_client, AdminCredentials};
    use mock_utils::mongodb_runner::MongodRunner;
    use mongodb::Client;

    pub const ADMIN_USER: &str = "admin";
    pub const ADMIN_PASSWORD: &str = "password";

    pub fn init_logging() {
        dotenv::dotenv().ok();
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Ephemeral mongod with a root user, plus a client authenticated as `password`.
    pub async fn mongod_with_admin(password: &str) -> anyhow::Result<(MongodRunner, Client)> {
        let mongod = MongodRunner::run()?;
        mongod.create_root_user(ADMIN_USER, ADMIN_PASSWORD).await?;
        let client = authenticated_client(
            mongod.client_options()?,
            &AdminCredentials::new(ADMIN_USER, password),
        )?;
        Ok((mongod, client))
    }

    pub fn config(preset: Preset) -> BootstrapConfig {
        let args = ConnectionArgs {
            preset,
            ..Default::default()
        };
        let connection = ConnectionConfig::from_args(&args).expect("valid connection config");
        BootstrapConfig::new(connection, &InitArgs::default()).expect("valid bootstrap config")
    }
}
