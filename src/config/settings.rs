//! Application configuration settings
//!
//! Environment-driven settings for the API connection and logging

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Remote API configuration
    pub api: ApiConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API base URL, e.g. `http://localhost:3001/api`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: u64,
    /// User-Agent sent with every request
    pub user_agent: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001/api".to_string(),
            timeout: 30,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl Settings {
    /// Create a new configuration instance
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let settings = Self {
            api: ApiConfig {
                base_url: get_env_or_default("BAKERY_API_URL", "http://localhost:3001/api"),
                timeout: get_env_or_default("BAKERY_API_TIMEOUT", "30")
                    .parse()
                    .context("Invalid timeout value")?,
                user_agent: std::env::var("BAKERY_USER_AGENT")
                    .unwrap_or_else(|_| default_user_agent()),
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Settings pointing at an explicit base URL, everything else default
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                ..ApiConfig::default()
            },
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        if !self.api.base_url.starts_with("http") {
            anyhow::bail!("Invalid API base URL format, should start with 'http'");
        }

        if self.api.timeout == 0 {
            anyhow::bail!("Timeout value cannot be 0");
        }

        if self.api.user_agent.trim().is_empty() {
            anyhow::bail!("User agent cannot be empty");
        }

        EnvFilter::try_new(&self.logging.level)
            .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", self.logging.level, e))?;

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }
}

fn default_user_agent() -> String {
    format!("bakery-gateway/{}", env!("CARGO_PKG_VERSION"))
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_base_url_is_valid() {
        let settings = Settings::with_base_url("http://127.0.0.1:3001/api/");
        assert!(settings.validate().is_ok());
        assert_eq!(settings.base_url(), "http://127.0.0.1:3001/api");
        assert!(settings.api.user_agent.starts_with("bakery-gateway/"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = Settings::with_base_url("ftp://example.com");
        assert!(settings.validate().is_err());

        settings.api.base_url = "https://example.com".to_string();
        settings.api.timeout = 0;
        assert!(settings.validate().is_err());

        settings.api.timeout = 10;
        settings.logging.format = "yaml".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_log_level_accepts_filter_directives() {
        let mut settings = Settings::with_base_url("http://127.0.0.1:3001/api");
        for level in ["debug", "bakery_gateway=debug", "bakery_gateway=trace,reqwest=warn,info"] {
            settings.logging.level = level.to_string();
            assert!(settings.validate().is_ok(), "{} should be accepted", level);
        }

        settings.logging.level = "bakery_gateway=loud".to_string();
        assert!(settings.validate().is_err());
    }
}
