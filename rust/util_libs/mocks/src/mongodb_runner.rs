use anyhow::Context;
use bson::doc;
use mongodb::{
    options::{ClientOptions, ServerAddress},
    Client,
};
use std::{
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
    time::{Duration, Instant},
};
use tempfile::TempDir;

const SOCKET_FILE_NAME: &str = "mongod.sock";
const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Throwaway `mongod` listening only on a unix socket inside its own data dir.
/// The process is killed and the directory removed on drop.
pub struct MongodRunner {
    child: Child,
    // keeps the data dir (and socket) alive for the runner's lifetime
    tempdir: TempDir,
}

impl MongodRunner {
    pub fn run() -> anyhow::Result<Self> {
        let tempdir = TempDir::new().context("Failed to create mongod data dir")?;
        let dir = tempdir.path().canonicalize()?;
        let socket = dir.join(SOCKET_FILE_NAME);
        let dir_arg = dir
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("non UTF-8 data dir: {:?}", dir))?;
        let socket_arg = socket
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("non UTF-8 socket path: {:?}", socket))?;

        let child = Command::new("mongod")
            .args([
                "--dbpath",
                dir_arg,
                "--unixSocketPrefix",
                dir_arg,
                "--bind_ip",
                socket_arg,
                "--port",
                "0",
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("Failed to start mongod; is it installed and on the PATH?")?;
        let runner = Self { child, tempdir };

        wait_for_socket(&socket, STARTUP_TIMEOUT)?;
        log::debug!("mongod listening on {:?}", socket);
        Ok(runner)
    }

    pub fn socket_path(&self) -> anyhow::Result<PathBuf> {
        Ok(self.tempdir.path().canonicalize()?.join(SOCKET_FILE_NAME))
    }

    /// Options pointing at the runner's socket, without credentials.
    pub fn client_options(&self) -> anyhow::Result<ClientOptions> {
        let address = ServerAddress::Unix {
            path: self.socket_path()?,
        };
        Ok(ClientOptions::builder().hosts(vec![address]).build())
    }

    /// Unauthenticated client. The instance runs without `--auth`, so this client
    /// may create users.
    pub fn client(&self) -> anyhow::Result<Client> {
        Ok(Client::with_options(self.client_options()?)?)
    }

    /// Registers a `root` user in `admin`, as the official image does for
    /// `MONGO_INITDB_ROOT_USERNAME`.
    pub async fn create_root_user(&self, username: &str, password: &str) -> anyhow::Result<()> {
        self.client()?
            .database("admin")
            .run_command(doc! {
                "createUser": username,
                "pwd": password,
                "roles": [{ "role": "root", "db": "admin" }],
            })
            .await
            .context("Failed to create root user")?;
        Ok(())
    }
}

fn wait_for_socket(socket: &Path, timeout: Duration) -> anyhow::Result<()> {
    let deadline = Instant::now() + timeout;
    while !socket.exists() {
        if Instant::now() >= deadline {
            anyhow::bail!("mongod did not open {:?} within {:?}", socket, timeout);
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    Ok(())
}

impl Drop for MongodRunner {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
