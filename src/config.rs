use crate::error::{NovaError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovaConfig {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub polling: PollingConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    // Archive uploads on import discover can be large
    pub upload_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub api_key: Option<String>,
    pub header_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for NovaConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
                timeout_secs: 30,
                upload_timeout_secs: 300,
                user_agent: "Nova-Catalog/0.1.0".to_string(),
            },
            auth: AuthConfig {
                api_key: None,
                header_name: "x-api-key".to_string(),
            },
            polling: PollingConfig {
                interval_ms: 1000,
                max_attempts: 120,
            },
            cache: CacheConfig {
                enabled: false,
                path: "nova_catalog_cache".to_string(),
            },
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl NovaConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Override with environment variables
        if let Ok(base_url) = std::env::var("NOVA_CATALOG_BASE_URL") {
            if !base_url.trim().is_empty() {
                config.api.base_url = base_url;
            }
        }

        if let Ok(timeout) = std::env::var("NOVA_CATALOG_TIMEOUT_SECS") {
            config.api.timeout_secs = timeout
                .parse()
                .map_err(|_| NovaError::config_error("Invalid NOVA_CATALOG_TIMEOUT_SECS"))?;
        }

        if let Ok(timeout) = std::env::var("NOVA_CATALOG_UPLOAD_TIMEOUT_SECS") {
            config.api.upload_timeout_secs = timeout.parse().map_err(|_| {
                NovaError::config_error("Invalid NOVA_CATALOG_UPLOAD_TIMEOUT_SECS")
            })?;
        }

        config.auth.api_key = std::env::var("NOVA_CATALOG_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        if let Ok(header_name) = std::env::var("NOVA_CATALOG_AUTH_HEADER") {
            if !header_name.trim().is_empty() {
                config.auth.header_name = header_name;
            }
        }

        if let Ok(interval) = std::env::var("NOVA_CATALOG_POLL_INTERVAL_MS") {
            config.polling.interval_ms = interval
                .parse()
                .map_err(|_| NovaError::config_error("Invalid NOVA_CATALOG_POLL_INTERVAL_MS"))?;
        }
        if let Ok(attempts) = std::env::var("NOVA_CATALOG_POLL_MAX_ATTEMPTS") {
            config.polling.max_attempts = attempts
                .parse()
                .map_err(|_| NovaError::config_error("Invalid NOVA_CATALOG_POLL_MAX_ATTEMPTS"))?;
        }

        if let Ok(enabled) = std::env::var("NOVA_CATALOG_CACHE_ENABLED") {
            config.cache.enabled = matches!(enabled.as_str(), "1" | "true" | "TRUE" | "yes" | "on");
        }
        if let Ok(path) = std::env::var("NOVA_CATALOG_CACHE_PATH") {
            if !path.trim().is_empty() {
                config.cache.path = path;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NovaError::config_error(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: NovaConfig = toml::from_str(content)
            .map_err(|e| NovaError::config_error(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(NovaError::config_error(
                "api.base_url must start with http:// or https://",
            ));
        }
        if self.polling.max_attempts == 0 {
            return Err(NovaError::config_error(
                "polling.max_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_toml() {
        let toml = r#"
            [api]
            base_url = "https://catalog.example.com/api"
            timeout_secs = 10
            upload_timeout_secs = 600
            user_agent = "test"

            [auth]
            api_key = "secret"
            header_name = "authorization"

            [polling]
            interval_ms = 250
            max_attempts = 8

            [cache]
            enabled = true
            path = "/tmp/cache"
        "#;
        let config = NovaConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.api.upload_timeout(), Duration::from_secs(600));
        assert_eq!(config.polling.interval(), Duration::from_millis(250));
        assert_eq!(config.auth.api_key.as_deref(), Some("secret"));
        assert!(config.cache.enabled);
    }

    #[test]
    fn rejects_zero_poll_attempts() {
        let mut config = NovaConfig::default();
        config.polling.max_attempts = 0;
        assert!(matches!(config.validate(), Err(NovaError::ConfigError(_))));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = NovaConfig::default();
        config.api.base_url = "ftp://nope".into();
        assert!(config.validate().is_err());
    }
}
