//! Clinic Admin Configuration
//!
//! TOML-based configuration with environment variable override support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub actor: ActorConfig,

    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            actor: ActorConfig::default(),
            log_level: "warn".to_string(),
        }
    }
}

/// Backend REST API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
            user_agent: format!("cm-admin/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Where the bearer token is kept between invocations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join("clinic-admin").join("session.json"),
        }
    }
}

/// Audit identity and practice scope stamped on mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub name: String,
    pub practice_id: i64,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            name: "admin".to_string(),
            practice_id: 2,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::ValidationError("api.base_url must be set".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "api.base_url must start with http:// or https://, got {}",
                url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Clinic Admin Configuration
# Environment variables (CLINIC_ADMIN_*) override these settings

log_level = "warn"

[api]
base_url = "http://localhost:5000"
timeout_secs = 10

[session]
# Bearer token storage; removed on logout or when the backend answers 401
path = "/home/me/.local/share/clinic-admin/session.json"

[actor]
# Stamped into createdBy/updatedBy/deletedBy
name = "admin"
# Practice scope for module mutations
practice_id = 2
"#
        .to_string()
    }
}
