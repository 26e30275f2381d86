//! Configuration module
//!
//! Reads TOML from `~/.config/helpdesk/config.toml`; the path can be
//! overridden with `HELPDESK_CONFIG`. Missing files fall back to defaults
//! so a bare `helpdesk-service` still starts for local development.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub security: SecurityConfig,
    pub admin: AdminConfig,
    pub smtp: SmtpConfig,
    pub classifier: ClassifierConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://./helpdesk.db?mode=rwc".to_string(),
        }
    }
}

impl DatabaseSettings {
    /// `DATABASE_URL` wins over the configured value.
    pub fn connection_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| self.url.clone())
    }
}

/// JWT settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "super-secret-key-change-in-production".to_string(),
            jwt_expiration_hours: 24,
        }
    }
}

/// Bootstrap admin created at startup when the store has no users
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: "admin@helpdesk.local".to_string(),
            password: "change-me-now".to_string(),
        }
    }
}

/// SMTP relay settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    /// Use SMTPS instead of STARTTLS
    pub implicit_tls: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 2525,
            username: String::new(),
            password: String::new(),
            from_email: "noreply@helpdesk.local".to_string(),
            from_name: "Helpdesk".to_string(),
            implicit_tls: false,
        }
    }
}

/// Classification provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub url: String,
    pub api_key: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8088/classify".to_string(),
            api_key: String::new(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Default config file location: `<config dir>/helpdesk/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("helpdesk")
        .join("config.toml")
}
