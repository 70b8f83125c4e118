//! Configuration management for agencydesk.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::content::SanitizeMode;
use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "agencydesk";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `AGENCYDESK_`, sections split on `__`)
/// 2. TOML config file at `~/.config/agencydesk/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Admin authentication configuration.
    pub auth: AuthConfig,
    /// Content handling configuration.
    pub content: ContentConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind_address: String,
    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the collection files.
    /// Defaults to `~/.local/share/agencydesk`
    pub data_dir: Option<PathBuf>,
}

/// Admin authentication configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Lifetime of an admin session in minutes.
    pub session_ttl_minutes: u32,
    /// Minimum accepted password length.
    pub min_password_length: usize,
    /// Owner account created on startup when no admin users exist.
    pub bootstrap_owner: Option<BootstrapOwner>,
}

/// Credentials for the first owner account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapOwner {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Initial password.
    pub password: String,
}

/// Content handling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// What to do with unsafe markup in rich text.
    pub sanitize_mode: SanitizeMode,
    /// Default page size for public listings.
    pub default_per_page: usize,
    /// Upper bound on requested page size.
    pub max_per_page: usize,
    /// Reading speed used for reading-time estimates.
    pub words_per_minute: u32,
    /// Maximum length of derived excerpts in characters.
    pub excerpt_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_minutes: 12 * 60,
            min_password_length: 8,
            bootstrap_owner: None,
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            sanitize_mode: SanitizeMode::Strip,
            default_per_page: 10,
            max_per_page: 100,
            words_per_minute: 200,
            excerpt_length: 200,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `AGENCYDESK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("AGENCYDESK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.bind_address.parse::<SocketAddr>().is_err() {
            return Err(Error::ConfigValidation {
                message: format!("invalid bind_address: {}", self.server.bind_address),
            });
        }

        if self.auth.session_ttl_minutes == 0 {
            return Err(Error::ConfigValidation {
                message: "session_ttl_minutes must be greater than 0".to_string(),
            });
        }

        if self.content.default_per_page == 0
            || self.content.default_per_page > self.content.max_per_page
        {
            return Err(Error::ConfigValidation {
                message: format!(
                    "default_per_page ({}) must be between 1 and max_per_page ({})",
                    self.content.default_per_page, self.content.max_per_page
                ),
            });
        }

        if self.content.words_per_minute == 0 {
            return Err(Error::ConfigValidation {
                message: "words_per_minute must be greater than 0".to_string(),
            });
        }

        if let Some(owner) = &self.auth.bootstrap_owner {
            if owner.password.chars().count() < self.auth.min_password_length {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "bootstrap_owner password is shorter than min_password_length ({})",
                        self.auth.min_password_length
                    ),
                });
            }
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the session lifetime as a chrono duration.
    #[must_use]
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.auth.session_ttl_minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
        assert!(config.storage.data_dir.is_none());
        assert!(config.auth.bootstrap_owner.is_none());
        assert_eq!(config.content.sanitize_mode, SanitizeMode::Strip);
    }

    #[test]
    fn test_default_content_config() {
        let content = ContentConfig::default();

        assert_eq!(content.default_per_page, 10);
        assert_eq!(content.max_per_page, 100);
        assert_eq!(content.words_per_minute, 200);
        assert_eq!(content.excerpt_length, 200);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_bind_address() {
        let mut config = Config::default();
        config.server.bind_address = "not an address".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("bind_address"));
    }

    #[test]
    fn test_validate_zero_ttl() {
        let mut config = Config::default();
        config.auth.session_ttl_minutes = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("session_ttl_minutes"));
    }

    #[test]
    fn test_validate_per_page_above_max() {
        let mut config = Config::default();
        config.content.default_per_page = 500;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("default_per_page"));
    }

    #[test]
    fn test_validate_short_bootstrap_password() {
        let mut config = Config::default();
        config.auth.bootstrap_owner = Some(BootstrapOwner {
            name: "Owner".to_string(),
            email: "owner@example.com".to_string(),
            password: "short".to_string(),
        });

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("bootstrap_owner"));
    }

    #[test]
    fn test_data_dir_default() {
        let config = Config::default();
        assert!(config.data_dir().to_string_lossy().contains("agencydesk"));
    }

    #[test]
    fn test_data_dir_custom() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/srv/agencydesk"));
        assert_eq!(config.data_dir(), PathBuf::from("/srv/agencydesk"));
    }

    #[test]
    fn test_session_ttl() {
        let config = Config::default();
        assert_eq!(config.session_ttl(), chrono::Duration::hours(12));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("agencydesk"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nbind_address = \"0.0.0.0:8080\"\n\n[content]\nsanitize_mode = \"reject\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.content.sanitize_mode, SanitizeMode::Reject);
        assert_eq!(config.content.default_per_page, 10);
    }

    #[test]
    fn test_auth_config_deserialize() {
        let json = r#"{"session_ttl_minutes": 30}"#;
        let auth: AuthConfig = serde_json::from_str(json).unwrap();
        assert_eq!(auth.session_ttl_minutes, 30);
        assert_eq!(auth.min_password_length, 8);
    }
}
