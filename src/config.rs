//! Configuration management.
//!
//! One TOML file (`config.toml` by default) with three sections: where the
//! snapshot lives, how the household's calendar works, and how to log. Every
//! field has a default so a missing file or a sparse file both work; `init`
//! writes the full default file for editing.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::engine::types::{EngineConfig, DEFAULT_DAILY_PURCHASE_LIMIT};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// UTC offsets beyond ±18 hours are not representable.
    #[error("utc_offset_minutes {0} is out of range")]
    OffsetOutOfRange(i32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the snapshot document.
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// The household's fixed UTC offset in minutes. Decides what "today",
    /// "yesterday" and "this week" mean for streaks, weekly goals and the
    /// daily purchase counter.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Shop purchases allowed per player per local day.
    #[serde(default = "default_daily_purchase_limit")]
    pub daily_purchase_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file; stderr only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_storage")]
    pub storage: StorageConfig,
    #[serde(default = "default_game")]
    pub game: GameConfig,
    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

fn default_state_file() -> String {
    "data/state.json".to_string()
}

fn default_daily_purchase_limit() -> u32 {
    DEFAULT_DAILY_PURCHASE_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_storage() -> StorageConfig {
    StorageConfig {
        state_file: default_state_file(),
    }
}

fn default_game() -> GameConfig {
    GameConfig {
        utc_offset_minutes: 0,
        daily_purchase_limit: default_daily_purchase_limit(),
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file: None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            game: default_game(),
            logging: default_logging(),
        }
    }
}

impl Config {
    /// Load from a TOML file.
    pub async fn load(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).await.map_err(|e| ConfigError::Read {
            path: path.to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            source: e,
        })
    }

    /// Load from a TOML file, falling back to defaults when it is absent.
    pub async fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        match fs::read_to_string(path).await {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_string(),
                source: e,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Read {
                path: path.to_string(),
                source: e,
            }),
        }
    }

    /// Write the full default file for `init`.
    pub async fn create_default(path: &str) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(&Self::default())?;
        fs::write(path, content).await.map_err(|e| ConfigError::Write {
            path: path.to_string(),
            source: e,
        })
    }

    /// Resolve the knobs the rules core needs.
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let tz = FixedOffset::east_opt(self.game.utc_offset_minutes * 60)
            .ok_or(ConfigError::OffsetOutOfRange(self.game.utc_offset_minutes))?;
        Ok(EngineConfig {
            tz,
            daily_purchase_limit: self.game.daily_purchase_limit,
        })
    }
}
