//! Queue configuration

use super::error::{PhotoQueueError, Result};
use super::paths::get_database_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Queue settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    /// Mirror the selection and upload lists into the store
    pub enable_persistence: bool,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Buffered events per subscriber before slow subscribers start lagging
    pub event_capacity: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            enable_persistence: true,
            database_path: get_database_path(),
            event_capacity: 256,
        }
    }
}

impl QueueSettings {
    /// Load settings from a JSON file, filling missing keys with defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.validated()
    }

    /// Point the store at another file, revalidating the result
    pub fn with_database_path(mut self, path: PathBuf) -> Result<Self> {
        self.database_path = path;
        self.validated()
    }

    /// Enforce sane minimums
    pub fn validated(mut self) -> Result<Self> {
        if self.event_capacity == 0 {
            self.event_capacity = 1;
        }
        if self.enable_persistence && self.database_path.as_os_str().is_empty() {
            return Err(PhotoQueueError::Config(
                "database_path is required when persistence is enabled".to_string(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = QueueSettings::default();
        assert!(config.enable_persistence);
        assert!(config.event_capacity > 0);
        assert!(config.database_path.ends_with("photoqueue.db"));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "enable_persistence": false, "event_capacity": 0 }"#).unwrap();

        let config = QueueSettings::load(&path).unwrap();
        assert!(!config.enable_persistence);
        assert_eq!(config.event_capacity, 1);
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let config = QueueSettings {
            database_path: PathBuf::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.validated(),
            Err(PhotoQueueError::Config(_))
        ));
    }

    #[test]
    fn test_database_override_is_validated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("override.db");

        let config = QueueSettings::default()
            .with_database_path(path.clone())
            .unwrap();
        assert_eq!(config.database_path, path);

        assert!(matches!(
            QueueSettings::default().with_database_path(PathBuf::new()),
            Err(PhotoQueueError::Config(_))
        ));
    }

    #[test]
    fn test_empty_override_allowed_without_persistence() {
        let config = QueueSettings {
            enable_persistence: false,
            ..Default::default()
        };
        assert!(config.with_database_path(PathBuf::new()).is_ok());
    }
}
