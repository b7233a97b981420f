//! Configuration management for sedrun
//!
//! sedrun stores configuration in ~/.sedrun/config.toml

use crate::input::DEFAULT_MAX_CHUNK;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Smallest accepted read chunk
const MIN_CHUNK_BYTES: usize = 16;

/// sedrun configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Debug logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Largest chunk read from input at once, in bytes
    #[serde(default = "default_max_chunk_bytes")]
    pub max_chunk_bytes: Option<usize>,

    /// Suppress automatic printing by default
    #[serde(default = "default_quiet")]
    pub quiet: Option<bool>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chunk_bytes: default_max_chunk_bytes(),
            quiet: default_quiet(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write a debug log to ~/.sedrun/sedrun.log
    #[serde(default = "default_debug")]
    pub debug: Option<bool>,

    /// tracing filter directive
    #[serde(default = "default_level")]
    pub level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug: default_debug(),
            level: default_level(),
        }
    }
}

// Default functions for serde
fn default_max_chunk_bytes() -> Option<usize> { Some(DEFAULT_MAX_CHUNK) }
fn default_quiet() -> Option<bool> { Some(false) }
fn default_debug() -> Option<bool> { Some(false) }
fn default_level() -> Option<String> { Some("sedrun=info".to_string()) }

impl Config {
    pub fn max_chunk_bytes(&self) -> usize {
        self.engine.max_chunk_bytes.unwrap_or(DEFAULT_MAX_CHUNK)
    }

    pub fn quiet(&self) -> bool {
        self.engine.quiet.unwrap_or(false)
    }

    pub fn debug(&self) -> bool {
        self.logging.debug.unwrap_or(false)
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or("sedrun=info")
    }
}

/// Get the sedrun home directory (~/.sedrun), creating it if needed
pub fn sedrun_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;

    let dir = home_dir.join(".sedrun");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

    Ok(dir)
}

/// Get the configuration file path
pub fn config_file_path() -> Result<PathBuf> {
    Ok(sedrun_dir()?.join("config.toml"))
}

/// Get the default configuration file content with comments
fn get_default_config_content() -> &'static str {
    r#"# sedrun Configuration File
#
# Values set here can be overridden by command-line flags.

[engine]
# Largest chunk read from input at once, in bytes (default: 4096, min: 16)
# Longer lines are read in several chunks and joined transparently.
max_chunk_bytes = 4096

# Suppress the automatic print at the end of each cycle (like -n)
quiet = false

[logging]
# Write a debug log to ~/.sedrun/sedrun.log (default: false)
debug = false

# tracing filter used when debug logging is on
level = "sedrun=info"
"#
}

/// Write the default commented configuration file to `path`
pub fn save_default_config_to(path: &Path) -> Result<()> {
    fs::write(path, get_default_config_content())
        .with_context(|| format!("Failed to write default config file: {}", path.display()))
}

/// Save the default commented configuration file
pub fn save_default_config() -> Result<()> {
    save_default_config_to(&config_file_path()?)
}

/// Load configuration from `path`
///
/// A missing file is created with defaults. A malformed file is replaced
/// with defaults.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        save_default_config_to(path)?;
    }

    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    match toml::from_str(&config_str) {
        Ok(config) => Ok(config),
        Err(_) => {
            save_default_config_to(path)?;
            Ok(Config::default())
        }
    }
}

/// Load configuration from ~/.sedrun/config.toml
pub fn load_config() -> Result<Config> {
    load_config_from(&config_file_path()?)
}

/// Validate configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(bytes) = config.engine.max_chunk_bytes {
        if bytes < MIN_CHUNK_BYTES {
            anyhow::bail!(
                "Invalid max_chunk_bytes: {} (min {} bytes)",
                bytes,
                MIN_CHUNK_BYTES
            );
        }
    }

    if let Some(level) = &config.logging.level {
        if level.trim().is_empty() {
            anyhow::bail!("Invalid logging level: must not be empty");
        }
    }

    Ok(())
}
