//! Application Configuration
//!
//! JSON file under the platform config dir, with environment overrides for
//! the store connection. A missing file means defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::sync::WriteBackPolicy;

pub const ENV_STORE_URL: &str = "BUILDCO_STORE_URL";
pub const ENV_STORE_KEY: &str = "BUILDCO_STORE_KEY";
pub const ENV_DB_PATH: &str = "BUILDCO_DB_PATH";

const APP_DIR: &str = "buildco-admin";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },

    #[error("API key variable '{var}' is not set")]
    MissingApiKey { var: String },
}

/// Where content is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    /// Local SQLite file
    Sqlite { path: PathBuf },
    /// Hosted PostgREST backend; the key is read from `api_key_env`
    Rest { url: String, api_key_env: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: Backend,
    pub write_back: WriteBackPolicy,
    pub log_dir: PathBuf,
    pub request_timeout_secs: u64,
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Sqlite {
                path: data_dir().join("buildco.db"),
            },
            write_back: WriteBackPolicy::default(),
            log_dir: data_dir().join("logs"),
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// `<config_dir>/buildco-admin/config.json`
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join(APP_DIR).join("config.json")
    }

    /// Load from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load `path` (defaults if it does not exist), apply environment
    /// overrides, then validate.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })?;
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            AppConfig::default()
        };

        config.apply_overrides(|var| std::env::var(var).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `BUILDCO_*` overrides looked up through `lookup`.
    /// A store URL switches to the REST backend; a DB path only applies to
    /// the SQLite backend.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_STORE_URL) {
            let api_key_env = match &self.backend {
                Backend::Rest { api_key_env, .. } => api_key_env.clone(),
                Backend::Sqlite { .. } => ENV_STORE_KEY.to_string(),
            };
            self.backend = Backend::Rest { url, api_key_env };
        }
        if let Some(db_path) = non_empty(ENV_DB_PATH) {
            match &mut self.backend {
                Backend::Sqlite { path } => *path = PathBuf::from(db_path),
                Backend::Rest { .. } => {
                    log::warn!("{} ignored: REST backend is configured", ENV_DB_PATH)
                }
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::ValidationError { message });

        match &self.backend {
            Backend::Sqlite { path } => {
                if path.as_os_str().is_empty() {
                    return invalid("sqlite path must not be empty".to_string());
                }
            }
            Backend::Rest { url, api_key_env } => {
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return invalid(format!("store url must be http(s), got '{}'", url));
                }
                if api_key_env.trim().is_empty() {
                    return invalid("api_key_env must name an environment variable".to_string());
                }
            }
        }
        if self.request_timeout_secs == 0 {
            return invalid("request_timeout_secs must be positive".to_string());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Read the REST API key from the configured variable
    pub fn api_key(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
        match &self.backend {
            Backend::Rest { api_key_env, .. } => {
                lookup(api_key_env).ok_or_else(|| ConfigError::MissingApiKey {
                    var: api_key_env.clone(),
                })
            }
            Backend::Sqlite { .. } => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.write_back, WriteBackPolicy::Concurrent);
        assert!(matches!(config.backend, Backend::Sqlite { .. }));
        assert!(AppConfig::config_path().ends_with("buildco-admin/config.json"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let loaded = AppConfig::load_from(&dir.path().join("nope.json")).unwrap();
        // Process env may carry overrides; compare what they cannot touch
        assert_eq!(loaded.request_timeout_secs, config.request_timeout_secs);
        assert_eq!(loaded.log_dir, config.log_dir);
    }

    #[test]
    fn test_parses_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "write_back": "single_flight", "request_timeout_secs": 5, "log_dir": "/tmp/logs" }"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.write_back, WriteBackPolicy::SingleFlight);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
    }

    #[test]
    fn test_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_store_url_switches_to_rest() {
        let mut config = AppConfig::default();
        config.apply_overrides(env(&[(ENV_STORE_URL, "https://abc.example.co")]));

        assert_eq!(
            config.backend,
            Backend::Rest {
                url: "https://abc.example.co".to_string(),
                api_key_env: ENV_STORE_KEY.to_string(),
            }
        );
        let key = config.api_key(env(&[(ENV_STORE_KEY, "secret")])).unwrap();
        assert_eq!(key, "secret");
        assert!(matches!(
            config.api_key(env(&[])),
            Err(ConfigError::MissingApiKey { .. })
        ));
    }

    #[test]
    fn test_db_path_override_applies_to_sqlite() {
        let mut config = AppConfig::default();
        config.apply_overrides(env(&[(ENV_DB_PATH, "/var/lib/buildco.db")]));
        assert_eq!(
            config.backend,
            Backend::Sqlite {
                path: PathBuf::from("/var/lib/buildco.db")
            }
        );

        config.apply_overrides(env(&[(ENV_DB_PATH, "  ")]));
        assert!(matches!(config.backend, Backend::Sqlite { .. }));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = AppConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let config = AppConfig {
            backend: Backend::Rest {
                url: "abc.example.co".to_string(),
                api_key_env: ENV_STORE_KEY.to_string(),
            },
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_backend_json_shape() {
        let json = r#"{ "backend": { "kind": "rest", "url": "https://x.example.co", "api_key_env": "KEY" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(config.backend, Backend::Rest { ref api_key_env, .. } if api_key_env == "KEY"));
    }
}
