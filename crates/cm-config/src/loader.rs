//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::io;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "clinic-admin.toml",
    "config.toml",
    "./config/clinic-admin.toml",
    "/etc/clinic-admin/config.toml",
];

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "CLINIC_ADMIN_CONFIG";

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file()? {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, |key| env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Explicit paths must exist; only the search paths are optional.
    fn find_config_file(&self) -> Result<Option<PathBuf>, ConfigError> {
        let explicit = self
            .config_path
            .clone()
            .or_else(|| env::var(CONFIG_ENV).ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::ReadError(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} does not exist", path.display()),
                )));
            }
            return Ok(Some(path));
        }

        Ok(CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists()))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `CLINIC_ADMIN_*` overrides read through `lookup`.
///
/// Numeric values that fail to parse are ignored.
pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    // API
    if let Some(val) = lookup("CLINIC_ADMIN_API_BASE_URL") {
        config.api.base_url = val.trim_end_matches('/').to_string();
    }
    if let Some(val) = lookup("CLINIC_ADMIN_API_TIMEOUT_SECS") {
        if let Ok(secs) = val.parse() {
            config.api.timeout_secs = secs;
        }
    }

    // Session
    if let Some(val) = lookup("CLINIC_ADMIN_SESSION_PATH") {
        config.session.path = PathBuf::from(val);
    }

    // Actor
    if let Some(val) = lookup("CLINIC_ADMIN_ACTOR_NAME") {
        config.actor.name = val;
    }
    if let Some(val) = lookup("CLINIC_ADMIN_PRACTICE_ID") {
        if let Ok(id) = val.parse() {
            config.actor.practice_id = id;
        }
    }

    // General
    if let Some(val) = lookup("CLINIC_ADMIN_LOG_LEVEL") {
        config.log_level = val;
    }
}
