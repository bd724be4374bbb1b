pub mod database_config;
pub mod defaults;
pub mod security_config;

use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use thiserror::Error;

pub use database_config::DatabaseConfig;
pub use security_config::SecurityConfig;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid database configuration: {0}")]
    Database(String),

    #[error("Invalid sync configuration: {0}")]
    Sync(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "defaults::default_host")]
    pub host: String,
    #[serde(default = "defaults::default_port")]
    pub port: u16,
    #[serde(default = "defaults::default_environment")]
    pub environment: String,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "defaults::default_logging_level")]
    pub level: String,
    #[serde(default = "defaults::default_logging_json_format")]
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::default_logging_level(),
            json_format: defaults::default_logging_json_format(),
        }
    }
}

/// Settings for the polling client that keeps an open conversation fresh.
#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    #[serde(default = "defaults::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "defaults::default_api_base_url")]
    pub api_base_url: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: defaults::default_poll_interval_ms(),
            api_base_url: defaults::default_api_base_url(),
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Box<figment::Error>> {
        Self::figment().extract().map_err(Box::new)
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Toml::file("config/development.toml").nested())
            .merge(Env::prefixed("APP_").split("__"))
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL"])
                    .map(|_| "database.url".into()),
            )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Database(
                "DATABASE_URL must be set".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Database(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.sync.poll_interval_ms == 0 {
            return Err(ConfigError::Sync(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
