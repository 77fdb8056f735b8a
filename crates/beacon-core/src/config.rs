//! Configuration management for beacon.
//!
//! Loads configuration from ${BEACON_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for beacon configuration and data directories.
    //!
    //! BEACON_HOME resolution order:
    //! 1. BEACON_HOME environment variable (if set)
    //! 2. ~/.config/beacon (default)
    //! 3. ./.beacon when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the beacon home directory.
    pub fn beacon_home() -> PathBuf {
        if let Ok(home) = std::env::var("BEACON_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".beacon"),
            |h| h.join(".config").join("beacon"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        beacon_home().join("config.toml")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        beacon_home().join("logs")
    }
}

/// Spinner appended to waiting entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinnerConfig {
    /// Animation frames. An empty list disables the spinner.
    pub frames: Vec<String>,
    /// Milliseconds each frame is shown.
    pub rate_ms: u64,
}

impl Default for SpinnerConfig {
    fn default() -> Self {
        Self {
            frames: ["|", "/", "-", "\\"].map(String::from).to_vec(),
            rate_ms: 50,
        }
    }
}

impl SpinnerConfig {
    pub fn rate(&self) -> Duration {
        Duration::from_millis(self.rate_ms.max(1))
    }
}

/// Status line configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// How long a toast stays visible, in milliseconds.
    pub toast_duration_ms: u64,
    pub spinner: SpinnerConfig,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            toast_duration_ms: 2000,
            spinner: SpinnerConfig::default(),
        }
    }
}

impl StatusConfig {
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing-subscriber` filter directive, overridden by `BEACON_LOG`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "beacon=info".to_string(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub status: StatusConfig,
    pub log: LogConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            let config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?;
            debug!(event = "core.config.loaded", path = %path.display());
            Ok(config)
        } else {
            debug!(event = "core.config.defaults", path = %path.display());
            Ok(Config::default())
        }
    }

    /// Writes the default config template to `path`.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())?;
        info!(event = "core.config.initialized", path = %path.display());
        Ok(())
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}
