use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    AnalyticsConfig, Config, IdentityConfig, InsightsConfig, LedgerConfig, LoggingConfig,
    ServerConfig, StorageBackend, StorageConfig,
};

/// Prefix of the environment variables that override file settings,
/// e.g. `TRADEBOOK__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "TRADEBOOK";

/// Loads the application configuration.
///
/// Reads the TOML file at `path` when it exists, overlays `TRADEBOOK__*` environment
/// variables, deserializes into the strongly-typed `Config` and validates it.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}
