//! Client configuration.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Marketplace client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the marketplace API.
    pub api_url: String,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// Where the session token is persisted.
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("MARKETPLACE_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout_secs: u64 = std::env::var("MARKETPLACE_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let session_file = match std::env::var("MARKETPLACE_SESSION_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_session_file()?,
        };

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
            session_file,
        })
    }

    /// Override the API base URL (e.g. from a command-line flag).
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        self
    }
}

fn default_session_file() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".marketplace").join("session.yaml"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            session_file: PathBuf::from(".marketplace/session.yaml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://localhost:4000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_api_url_override() {
        let config = ClientConfig::default().with_api_url(Some("https://api.example.com".into()));
        assert_eq!(config.api_url, "https://api.example.com");

        let config = ClientConfig::default().with_api_url(None);
        assert_eq!(config.api_url, "http://localhost:4000");
    }
}
