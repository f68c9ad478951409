use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::page::{SourceFormat, TimestampFormat};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tail: TailConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailConfig {
    /// Keep reading files as they grow.
    #[serde(default = "default_follow")]
    pub follow: bool,
    /// Read existing file contents before following.
    #[serde(default = "default_from_start")]
    pub from_start: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub descending: bool,
    #[serde(default)]
    pub wrap: bool,
    /// Keep non-matching lines visible while filtering.
    #[serde(default = "default_context")]
    pub context: bool,
    #[serde(default)]
    pub timestamps: TimestampFormat,
    #[serde(default)]
    pub sources: SourceFormat,
    #[serde(default = "default_color")]
    pub color: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Log file. Defaults to `logpane.log` in the data directory.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            follow: default_follow(),
            from_start: default_from_start(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            descending: false,
            wrap: false,
            context: default_context(),
            timestamps: TimestampFormat::default(),
            sources: SourceFormat::default(),
            color: default_color(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}

fn default_follow() -> bool {
    true
}

fn default_from_start() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_context() -> bool {
    true
}

fn default_color() -> bool {
    true
}

fn default_log_filter() -> String {
    "debug".to_string()
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("logpane")
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("logpane")
}

impl Config {
    /// Load the config at the default location, writing defaults on first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    pub fn log_path(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(|| data_dir().join("logpane.log"))
    }
}
