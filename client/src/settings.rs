use eyre::Result;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};

use crate::local::{LocalStorage, SETTINGS_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SortBy {
    #[default]
    CreatedAt,
    Priority,
    Alphabetical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub notifications: bool,
    pub voice_feedback: bool,
    /// Drop completed tasks once they are a week old.
    pub auto_delete: bool,
    pub sort_by: SortBy,
    pub show_completed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            theme: Theme::Light,
            notifications: true,
            voice_feedback: true,
            auto_delete: false,
            sort_by: SortBy::CreatedAt,
            show_completed: true,
        }
    }
}

impl Settings {
    pub async fn load(storage: &LocalStorage) -> Self {
        storage.get(SETTINGS_KEY).await.unwrap_or_default()
    }

    pub async fn save(&self, storage: &LocalStorage) -> Result<()> {
        storage.set(SETTINGS_KEY, self).await
    }

    pub async fn reset(storage: &LocalStorage) -> Result<Self> {
        let settings = Settings::default();
        settings.save(storage).await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_missing_settings_are_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&LocalStorage::new(dir.path())).await;
        assert_eq!(settings, Settings::default());
        assert!(settings.show_completed);
        assert!(!settings.auto_delete);
    }

    #[tokio::test]
    async fn test_save_load_and_reset() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = LocalStorage::new(dir.path());
        let settings = Settings {
            theme: Theme::Dark,
            auto_delete: true,
            sort_by: SortBy::Priority,
            ..Settings::default()
        };
        settings.save(&storage).await?;
        assert_eq!(Settings::load(&storage).await, settings);

        let reset = Settings::reset(&storage).await?;
        assert_eq!(reset, Settings::default());
        assert_eq!(Settings::load(&storage).await, Settings::default());
        Ok(())
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "theme": "dark", "sortBy": "alphabetical" }"#).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.sort_by, SortBy::Alphabetical);
        assert!(settings.voice_feedback);
    }

    #[rstest]
    #[case("createdAt", SortBy::CreatedAt)]
    #[case("priority", SortBy::Priority)]
    #[case("alphabetical", SortBy::Alphabetical)]
    fn test_sort_by_names(#[case] raw: &str, #[case] expected: SortBy) {
        assert_eq!(SortBy::from_str(raw).unwrap(), expected);
        assert_eq!(expected.as_ref(), raw);
    }
}
