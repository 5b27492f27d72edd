use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;

pub const TASKS_KEY: &str = "voiceTasks";
pub const SESSION_KEY: &str = "sessionId";
pub const SETTINGS_KEY: &str = "app-settings";

/// Key-value storage on disk, one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Missing and unreadable entries are both `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let contents = fs::read_to_string(self.path(key)).await.ok()?;
        serde_json::from_str(&contents)
            .map_err(|e| warn!("Ignoring corrupt local entry {}: {}", key, e))
            .ok()
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .wrap_err_with(|| format!("creating {}", self.dir.display()))?;
        let json = serde_json::to_string(value)?;
        fs::write(self.path(key), json)
            .await
            .wrap_err_with(|| format!("writing local entry {key}"))
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(e).wrap_err_with(|| format!("removing local entry {key}"))
            }
            _ => Ok(()),
        }
    }
}
