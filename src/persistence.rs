/*
 * Persistence Module
 *
 * Stores the debug-line toggles as a small JSON file so they survive between
 * runs. A missing file means "nothing stored yet" and yields the defaults.
 */

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::debug::DebugConfig;
use crate::error::PersistenceError;

pub const CONFIG_PATH_ENV: &str = "FLOCK_DEBUG_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "flock_debug.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    // $FLOCK_DEBUG_CONFIG, or flock_debug.json in the working directory
    pub fn from_env() -> Self {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::new(DEFAULT_CONFIG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<DebugConfig, PersistenceError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no stored debug config, using defaults");
                return Ok(DebugConfig::default());
            }
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&text).map_err(|source| PersistenceError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn store(&self, config: &DebugConfig) -> Result<(), PersistenceError> {
        let text = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, text).map_err(|source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load().unwrap(), DebugConfig::default());
    }

    #[test]
    fn stored_toggles_come_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("debug.json"));

        let mut config = DebugConfig::default();
        config.toggle_repel_line();
        config.toggle_axis();
        store.store(&config).unwrap();

        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn unknown_and_missing_keys_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.json");
        fs::write(&path, r#"{ "show_axis": true, "zoom": true }"#).unwrap();

        let config = ConfigStore::new(&path).load().unwrap();
        assert!(config.show_axis);
        assert!(!config.show_force_line);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.json");
        fs::write(&path, "not json").unwrap();

        let err = ConfigStore::new(&path).load().unwrap_err();
        assert!(matches!(err, PersistenceError::Parse { .. }));
    }
}
