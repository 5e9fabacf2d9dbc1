//! Playground settings.
//!
//! Every field has a default, so an empty or partial TOML file is valid.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::notification::DEFAULT_NOTIFICATION_MS;
use crate::persistence::DEFAULT_STORAGE_KEY;

pub const DEFAULT_AUTO_RUN_DELAY_MS: u64 = 500;
pub const DEFAULT_LOAD_RUN_DELAY_MS: u64 = 200;
pub const DEFAULT_NEWLINE_REFRESH_MS: u64 = 10;
pub const DEFAULT_STORE_DIR: &str = ".minipen";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaygroundConfig {
    /// Key of the single snapshot slot.
    pub storage_key: String,
    /// Whether auto-run starts enabled.
    pub auto_run: bool,
    /// Delay between an edit and its deferred render.
    pub auto_run_delay_ms: u64,
    /// Delay between a successful load and its render (auto-run only).
    pub load_run_delay_ms: u64,
    pub newline_refresh_ms: u64,
    /// Display window of a notification.
    pub notification_ms: u64,
    /// Directory of the file store (CLI).
    pub store_dir: PathBuf,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            auto_run: false,
            auto_run_delay_ms: DEFAULT_AUTO_RUN_DELAY_MS,
            load_run_delay_ms: DEFAULT_LOAD_RUN_DELAY_MS,
            newline_refresh_ms: DEFAULT_NEWLINE_REFRESH_MS,
            notification_ms: DEFAULT_NOTIFICATION_MS,
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
        }
    }
}

impl PlaygroundConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = PlaygroundConfig::from_toml_str("").unwrap();
        assert_eq!(config, PlaygroundConfig::default());
        assert_eq!(config.storage_key, "miniCodeEditor_savedCode");
        assert_eq!(config.auto_run_delay_ms, 500);
        assert_eq!(config.notification_ms, 3000);
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let config = PlaygroundConfig::from_toml_str(
            "auto_run = true\nstorage_key = \"scratch\"\nstore_dir = \"/tmp/pen\"\n",
        )
        .unwrap();
        assert!(config.auto_run);
        assert_eq!(config.storage_key, "scratch");
        assert_eq!(config.store_dir, PathBuf::from("/tmp/pen"));
        assert_eq!(config.load_run_delay_ms, 200);
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(matches!(
            PlaygroundConfig::from_toml_str("auto_run = maybe"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            PlaygroundConfig::from_toml_str("unknown_knob = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let error = PlaygroundConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
        assert!(error.to_string().contains("/definitely/not/here.toml"));
    }
}
