//! Configuration file for the `warden` binary.
//!
//! Resolution order for the file: `--config`, then `WARDEN_CONFIG` (both
//! handled by clap), then `<config dir>/warden/config.toml`. A missing file
//! means defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use warden_auth::GateConfig;
use warden_core::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Policy document used when `--policy` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_file: Option<PathBuf>,
    /// HTTP server settings for `warden serve`.
    pub server: ServerConfig,
    /// Gate settings for `warden serve`.
    pub gate: GateConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,
    /// Seconds between policy file reloads; 0 disables reloading.
    pub reload_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            reload_interval_secs: 0,
        }
    }
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            policy_file: None,
            server: ServerConfig::default(),
            gate: GateConfig::default().except("/healthz"),
        }
    }
}

impl WardenConfig {
    /// Project name, used in the config directory and in hints.
    pub const PROJECT_NAME: &'static str = "warden";

    /// `<config dir>/warden/config.toml`, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::PROJECT_NAME).join("config.toml"))
    }

    /// The explicit path if given, else the default path.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::default_config_path(),
        }
    }

    /// Load the configuration, falling back to defaults when the file does
    /// not exist.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        match Self::resolve_config_path(explicit) {
            Some(path) if path.exists() => Self::from_file(&path),
            Some(path) => {
                log::debug!("No config file at {}; using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Serialize as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}
