use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::converter::ConverterConfig;
use crate::engine::EngineConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub slskd: SlskdConfig,
    #[serde(default)]
    pub acquisition: EngineConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub converter: Option<ConverterConfig>,
}

/// slskd daemon connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlskdConfig {
    /// Daemon base URL (e.g., "http://localhost:5030")
    pub url: String,
    /// API key, sent as X-API-Key on every request
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Ledger database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tracks.db")
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub slskd: SanitizedSlskdConfig,
    pub acquisition: EngineConfig,
    pub database: DatabaseConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converter: Option<ConverterConfig>,
}

/// Sanitized slskd config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSlskdConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            slskd: SanitizedSlskdConfig {
                url: config.slskd.url.clone(),
                api_key_configured: !config.slskd.api_key.is_empty(),
                timeout_secs: config.slskd.timeout_secs,
            },
            acquisition: config.acquisition.clone(),
            database: config.database.clone(),
            converter: config.converter.clone(),
        }
    }
}
