use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_logging;
pub use settings::{
    AnalyticsSettings, Config, LogLevel, LoggingSettings, PriceLogSettings,
    SupportedSymbolsSettings,
};

/// Prefix of environment variables that override file settings,
/// e.g. `STOCKFOLIO__ANALYTICS__MAX_HISTORY_DAYS=30`.
pub const ENV_PREFIX: &str = "STOCKFOLIO";

/// Loads the application configuration from an optional `config.toml` in the
/// working directory, overlaid with `STOCKFOLIO__*` environment variables.
///
/// This function is the primary entry point for this crate. Every setting has
/// a default, so a missing file is not an error.
pub fn load_config() -> Result<Config, ConfigError> {
    build(config::File::with_name("config.toml").required(false))
}

/// Loads the configuration from an explicit TOML file, which must exist.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    build(config::File::new(&path.to_string_lossy(), config::FileFormat::Toml))
}

fn build<S>(file: S) -> Result<Config, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        // Default file names, relative to the working directory.
        .set_default("price_log.path", "stocks.csv")?
        .set_default("supported_symbols.path", "supportedStocks.txt")?
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}
