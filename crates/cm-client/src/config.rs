//! Client Configuration

use std::time::Duration;

/// Configuration for the admin API client
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for the backend, without a trailing slash
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Config {
    /// Create a new configuration with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(10),
            user_agent: format!("cm-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set custom user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost:5000")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = Config::new("https://api.clinic.example///");
        assert_eq!(config.url("/api/Users/login"), "https://api.clinic.example/api/Users/login");
    }
}
