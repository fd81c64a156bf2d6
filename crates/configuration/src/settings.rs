use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub price_log: PriceLogSettings,
    pub supported_symbols: SupportedSymbolsSettings,
    #[serde(default)]
    pub analytics: AnalyticsSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Config {
    /// Checks the values that deserialization alone cannot enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analytics.max_history_days == 0 {
            return Err(ConfigError::ValidationError(
                "analytics.max_history_days must be at least 1".to_string(),
            ));
        }
        if self.price_log.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "price_log.path must not be empty".to_string(),
            ));
        }
        if self.supported_symbols.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "supported_symbols.path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Location of the newest-first, symbol-grouped price log.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceLogSettings {
    /// Path to the CSV log (`SYMBOL,VALUE[,...]` per line, no header).
    pub path: PathBuf,
}

/// Location of the reference list of tradeable symbols.
#[derive(Debug, Clone, Deserialize)]
pub struct SupportedSymbolsSettings {
    /// Path to a file of comma-separated symbols.
    pub path: PathBuf,
}

/// Limits applied by the analytics operations.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsSettings {
    /// The widest history window (in days) a caller may request.
    pub max_history_days: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            max_history_days: 365,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub level: LogLevel,
    /// When set, logs are also written to a daily-rolling file in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_file_prefix() -> String {
    "stockfolio.log".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// The `EnvFilter` directive for this level.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
