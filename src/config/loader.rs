//! Configuration file loading with precedence handling.

use super::FilterSettings;
use crate::model::OperatorCode;
use crate::store::DEFAULT_STORAGE_KEY;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/gridcfg/config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Directory holding the file-backed layout store.
    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    /// Namespace key under which layouts are stored.
    #[serde(default)]
    pub storage_key: Option<String>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Filter behaviour section.
    #[serde(default)]
    pub filters: Option<FiltersSection>,
}

/// `[filters]` section.
///
/// ```toml
/// [filters]
/// default_operators = ["contains", "equals", "is_blank"]
/// cannot_and_operators = ["equals"]
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FiltersSection {
    /// Operators offered when a column declares no restriction.
    #[serde(default)]
    pub default_operators: Option<Vec<OperatorCode>>,

    /// Operators that cannot be ANDed with themselves.
    #[serde(default)]
    pub cannot_and_operators: Option<Vec<OperatorCode>>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Directory holding the file-backed layout store.
    pub store_dir: PathBuf,
    /// Namespace key under which layouts are stored.
    pub storage_key: String,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Filter behaviour shared by every grid.
    pub filters: FilterSettings,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_file_path: default_log_path(),
            filters: FilterSettings::default(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/gridcfg/gridcfg.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("gridcfg").join("gridcfg.log")
    } else {
        PathBuf::from("gridcfg.log")
    }
}

/// Resolve default layout store directory.
///
/// Returns `~/.local/share/gridcfg` on Unix-like systems, falling back to
/// `./gridcfg-store`.
pub fn default_store_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("gridcfg")
    } else {
        PathBuf::from("gridcfg-store")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/gridcfg/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gridcfg").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (like CLI `--config`)
/// 2. `GRIDCFG_CONFIG` environment variable
/// 3. Default path `~/.config/gridcfg/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("GRIDCFG_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    let filters = match config.filters {
        Some(section) => FilterSettings {
            default_operators: section
                .default_operators
                .filter(|ops| !ops.is_empty())
                .unwrap_or(defaults.filters.default_operators),
            cannot_and_operators: section
                .cannot_and_operators
                .unwrap_or(defaults.filters.cannot_and_operators),
        },
        None => defaults.filters,
    };

    ResolvedConfig {
        store_dir: config.store_dir.unwrap_or(defaults.store_dir),
        storage_key: config.storage_key.unwrap_or(defaults.storage_key),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        filters,
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `GRIDCFG_STORE_DIR`: Override store directory
/// - `GRIDCFG_STORAGE_KEY`: Override namespace key
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(dir) = std::env::var("GRIDCFG_STORE_DIR") {
        config.store_dir = PathBuf::from(dir);
    }

    if let Ok(key) = std::env::var("GRIDCFG_STORAGE_KEY") {
        if !key.is_empty() {
            config.storage_key = key;
        }
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    store_dir_override: Option<PathBuf>,
) -> ResolvedConfig {
    if let Some(dir) = store_dir_override {
        config.store_dir = dir;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
