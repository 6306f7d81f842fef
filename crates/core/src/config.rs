//! Configuration
//!
//! `PadConfig` arrives either as a JSON object passed to `setup` or from the
//! environment (with `.env` support). Every field has a default, so `{}` is a
//! valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::record::DEFAULT_HISTORY_LIMIT;
use crate::errors::{PadError, Result};
use crate::metadata::UNTITLED_PROMPT;
use crate::view::SortConfig;

pub const ENV_STORAGE: &str = "ORANGEPAD_STORAGE";
pub const ENV_DATA_DIR: &str = "ORANGEPAD_DATA_DIR";
pub const ENV_DB_PATH: &str = "ORANGEPAD_DB_PATH";
pub const ENV_LOG: &str = "ORANGEPAD_LOG";
pub const ENV_MAX_TEXT_LENGTH: &str = "ORANGEPAD_MAX_TEXT_LENGTH";

/// Default favorites sentinel
pub const FAVORITES_LABEL: &str = "🍊 Favorites";

/// Longest accepted prompt text, in characters
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 15000;

/// Default data directory (`<data_dir>/orangepad`)
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("orangepad")
}

/// Where the prompt collection lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    Memory,
    File { dir: PathBuf },
    Sqlite { path: PathBuf },
}

impl StorageConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            StorageConfig::Memory => "memory",
            StorageConfig::File { .. } => "file",
            StorageConfig::Sqlite { .. } => "sqlite",
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::File {
            dir: default_data_dir(),
        }
    }
}

/// Display labels used by the list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewLabels {
    /// Substituted for empty titles when sorting
    pub untitled:  String,
    /// Filter value meaning "favorites only"
    pub favorites: String,
}

impl Default for ViewLabels {
    fn default() -> Self {
        Self {
            untitled:  UNTITLED_PROMPT.to_string(),
            favorites: FAVORITES_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Limits {
    pub max_text_length: usize,
    pub history_limit:   usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            history_limit:   DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PadConfig {
    pub storage:      StorageConfig,
    pub labels:       ViewLabels,
    pub limits:       Limits,
    pub default_sort: SortConfig,
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub log_level:    String,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            storage:      StorageConfig::default(),
            labels:       ViewLabels::default(),
            limits:       Limits::default(),
            default_sort: SortConfig::default(),
            log_level:    "warn".to_string(),
        }
    }
}

impl PadConfig {
    /// Parse the object passed to `setup`; `null` means all defaults
    pub fn from_value(value: Value) -> Result<Self> {
        let config: PadConfig = if value.is_null() {
            PadConfig::default()
        } else {
            serde_json::from_value(value)
                .map_err(|e| PadError::ConfigError(format!("Invalid configuration: {}", e)))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Build from `ORANGEPAD_*` environment variables, loading `.env` first
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = PadConfig::default();

        let data_dir = lookup(ENV_DATA_DIR).map(PathBuf::from);
        let backend = lookup(ENV_STORAGE).unwrap_or_else(|| "file".to_string());

        config.storage = match backend.to_ascii_lowercase().as_str() {
            "memory" => StorageConfig::Memory,
            "file" => StorageConfig::File {
                dir: data_dir.unwrap_or_else(default_data_dir),
            },
            "sqlite" => StorageConfig::Sqlite {
                path: lookup(ENV_DB_PATH).map(PathBuf::from).unwrap_or_else(|| {
                    data_dir
                        .unwrap_or_else(default_data_dir)
                        .join("prompts.db")
                }),
            },
            other => {
                return Err(PadError::ConfigError(format!(
                    "{} must be one of memory, file, sqlite (got '{}')",
                    ENV_STORAGE, other
                )))
            },
        };

        if let Some(level) = lookup(ENV_LOG) {
            config.log_level = level;
        }

        if let Some(raw) = lookup(ENV_MAX_TEXT_LENGTH) {
            config.limits.max_text_length = raw.trim().parse().map_err(|_| {
                PadError::ConfigError(format!(
                    "{} must be a positive integer (got '{}')",
                    ENV_MAX_TEXT_LENGTH, raw
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.labels.untitled.trim().is_empty() {
            return Err(PadError::ConfigError("labels.untitled must not be empty".into()));
        }
        if self.labels.favorites.trim().is_empty() {
            return Err(PadError::ConfigError("labels.favorites must not be empty".into()));
        }
        if self.labels.untitled == self.labels.favorites {
            return Err(PadError::ConfigError(
                "labels.untitled and labels.favorites must differ".into(),
            ));
        }
        if self.limits.max_text_length == 0 {
            return Err(PadError::ConfigError("limits.maxTextLength must be > 0".into()));
        }
        if self.limits.history_limit == 0 {
            return Err(PadError::ConfigError("limits.historyLimit must be > 0".into()));
        }
        Ok(())
    }
}
