use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional; a missing section or field falls back to its default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub ledger: LedgerConfig,
    pub analytics: AnalyticsConfig,
    pub identity: IdentityConfig,
    pub insights: InsightsConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Rejects settings the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.analytics.initial_capital <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "analytics.initial_capital must be positive".to_string(),
            ));
        }
        if self.storage.backend == StorageBackend::File && self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.data_dir must be set for the file backend".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the HTTP API listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            ConfigError::ValidationError(format!("server.host '{}' is not an IP address", self.host))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// The durable key-value storage behind the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum StorageBackend {
    /// One JSON file per key inside `data_dir`.
    #[default]
    File,
    /// Process memory only; nothing survives a restart.
    Memory,
    /// A `kv_store` table in PostgreSQL, reached through `DATABASE_URL`.
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Seed (and immediately persist) the built-in sample ledger when storage holds no trades.
    pub seed_sample_trades: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            seed_sample_trades: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Starting account value of the equity curve.
    pub initial_capital: Decimal,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            initial_capital: Decimal::from(10_000),
        }
    }
}

/// Firebase Identity Toolkit settings. An empty `api_key` disables sign-in entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub api_key: String,
    pub base_url: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
        }
    }
}

/// Generative-model settings for trade pattern insights. An empty `api_key` disables them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
