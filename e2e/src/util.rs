use eyre::Result;
use rand::distr::Alphanumeric;
use rand::{rng, Rng};
use tempfile::TempDir;

use backend::{app, Api, Config};
use client::client::Client;

/// Lowest cost bcrypt accepts.
const TEST_BCRYPT_COST: u32 = 4;

/// A backend listening on a loopback port with its own data directory.
pub struct TestServer {
    pub base_url: String,
    pub data_dir: TempDir,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let base_url = serve(data_dir.path()).await?;
        Ok(Self { base_url, data_dir })
    }

    /// Boots a second backend over the same data directory, as after a restart.
    pub async fn restart(&self) -> Result<String> {
        serve(self.data_dir.path()).await
    }

    pub fn client(&self) -> Client {
        Client::with_base_url(self.base_url.clone())
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn serve(data_dir: &std::path::Path) -> Result<String> {
    let mut config = Config::default();
    config.storage.data_dir = data_dir.to_path_buf();
    config.auth.bcrypt_cost = TEST_BCRYPT_COST;

    let router = app(Api::from_config(&config).await, None);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    tokio::spawn(async move { axum::serve(listener, router).await });
    Ok(format!("http://{}/api", address))
}

pub fn random_email() -> String {
    let random_string: String = rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();

    format!("{}@gmail.com", random_string.to_lowercase())
}
