//! User-level configuration loaded from `~/.folio/config.toml`.
//!
//! The file is optional; if it does not exist every field falls back to its
//! `Default` value.

use crate::utils::{default_data_dir, folio_home};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the config file inside `~/.folio`
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum UserConfigError {
    #[error("Failed to read user config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse user config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Storage settings (`[store]` table in the TOML file).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Directory holding the collection files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Top-level user configuration, deserialized from `~/.folio/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    #[serde(default)]
    pub store: StoreConfig,
}

/// Canonical path of the user config file (`~/.folio/config.toml`)
#[must_use]
pub fn user_config_path() -> PathBuf {
    folio_home().join(CONFIG_FILENAME)
}

/// Load the user configuration from `~/.folio/config.toml`.
///
/// # Errors
///
/// Returns [`UserConfigError`] if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig, UserConfigError> {
    load_user_config_from(&user_config_path())
}

/// Load the user configuration from an explicit path, defaulting when the
/// file is absent.
///
/// # Errors
///
/// Returns [`UserConfigError`] if the file exists but cannot be read or parsed.
pub fn load_user_config_from(path: &Path) -> Result<UserConfig, UserConfigError> {
    if !path.exists() {
        debug!("User config not found at {}; using defaults", path.display());
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: UserConfig = toml::from_str(&content)?;
    debug!("Loaded user config from {}", path.display());
    Ok(config)
}

/// Pick the data directory: command line first, then the config file, then
/// `~/.folio/data`.
#[must_use]
pub fn resolve_data_dir(cli: Option<PathBuf>, config: &UserConfig) -> PathBuf {
    cli.or_else(|| config.store.data_dir.clone())
        .unwrap_or_else(default_data_dir)
}
