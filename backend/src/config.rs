use std::path::PathBuf;

use chrono::Duration;
use serde::Deserialize;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_SESSION_TTL_DAYS: i64 = 7;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Built client assets, served from `/` when set.
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_ttl_days: i64,
    pub bcrypt_cost: u32,
    pub sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::days(self.session_ttl_days)
    }
}

impl Config {
    /// Defaults, then `config/default.*` if present, then `TODO__SECTION__KEY` variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("storage.data_dir", DEFAULT_DATA_DIR)?
            .set_default("auth.session_ttl_days", DEFAULT_SESSION_TTL_DAYS)?
            .set_default("auth.bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))?
            .set_default("auth.sweep_interval_secs", DEFAULT_SWEEP_INTERVAL_SECS as i64)?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(
                config::Environment::with_prefix("TODO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Lowest cost bcrypt accepts.
#[cfg(test)]
pub(crate) const TEST_BCRYPT_COST: u32 = 4;
