use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    Sessions,
    Tasks,
}

impl Table {
    pub fn file_name(&self) -> &'static str {
        match self {
            Table::Users => "users.json",
            Table::Sessions => "sessions.json",
            Table::Tasks => "tasks.json",
        }
    }
}

/// One table as loaded: rows that decoded, plus the raw rows that did not.
///
/// Undecodable rows are invisible to lookups but are written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Rows<T> {
    pub records: Vec<T>,
    pub unreadable: Vec<Value>,
}

impl<T> Default for Rows<T> {
    fn default() -> Self {
        Rows {
            records: Vec::new(),
            unreadable: Vec::new(),
        }
    }
}

impl<T> From<Vec<T>> for Rows<T> {
    fn from(records: Vec<T>) -> Self {
        Rows {
            records,
            unreadable: Vec::new(),
        }
    }
}

/// Whole-table JSON files under one data directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        JsonStore {
            data_dir: data_dir.into(),
        }
    }

    pub fn path(&self, table: Table) -> PathBuf {
        self.data_dir.join(table.file_name())
    }

    /// Absent tables read as empty. A file that is not a JSON array is copied
    /// aside to `<file>.corrupt` and also reads as empty.
    pub async fn read<T: DeserializeOwned>(&self, table: Table) -> Rows<T> {
        let path = self.path(table);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) => {
                debug!("Table {} not loaded: {}", path.display(), e);
                return Rows::default();
            }
        };
        let raw: Vec<Value> = match serde_json::from_str(&contents) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Ignoring corrupt table {}: {}", path.display(), e);
                set_aside(&path).await;
                return Rows::default();
            }
        };

        let mut rows = Rows::default();
        for (index, row) in raw.into_iter().enumerate() {
            let decoded = T::deserialize(&row);
            match decoded {
                Ok(record) => rows.records.push(record),
                Err(e) => {
                    warn!("Skipping row {} of {}: {}", index, path.display(), e);
                    rows.unreadable.push(row);
                }
            }
        }
        rows
    }

    /// Replaces the table with `records` followed by the `unreadable` raw rows.
    pub async fn write<T: Serialize>(
        &self,
        table: Table,
        records: &[T],
        unreadable: &[Value],
    ) -> Result<()> {
        let path = self.path(table);
        let mut rows = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        rows.extend_from_slice(unreadable);
        let json = serde_json::to_string_pretty(&rows)?;
        fs::create_dir_all(&self.data_dir)
            .await
            .wrap_err_with(|| format!("creating {}", self.data_dir.display()))?;
        let tmp = sibling_path(&path, "tmp");
        fs::write(&tmp, json)
            .await
            .wrap_err_with(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .wrap_err_with(|| format!("replacing {}", path.display()))?;
        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

async fn set_aside(path: &Path) {
    let backup = sibling_path(path, "corrupt");
    match fs::copy(path, &backup).await {
        Ok(_) => warn!("Copied unreadable table to {}", backup.display()),
        Err(e) => error!("Failed to copy unreadable table {}: {}", path.display(), e),
    }
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
