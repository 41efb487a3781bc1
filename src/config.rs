//! Configuration types.
//!
//! The library `Config` has no CLI dependencies and can be constructed
//! programmatically; the binary maps command-line arguments onto it.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::error::GeoPulseError;

/// Default file name for the IP-range dataset.
pub const RANGES_FILE: &str = "ip-ranges.json";

/// Default file name for the exchange-rate dataset.
pub const RATES_FILE: &str = "exchange-rates.json";

/// Default file name for the refresh metadata.
pub const METADATA_FILE: &str = "metadata.json";

/// Default base currency for exchange-rate computation.
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Interval between scheduler ticks, in seconds.
pub const TICK_INTERVAL_SECS: u64 = 60;

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```
/// use geopulse::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     data_dir: PathBuf::from("./data"),
///     refresh_period_minutes: 60,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the dataset, rate, and metadata files.
    pub data_dir: PathBuf,

    /// Directory the local-copy refresher pulls dataset files from, if any.
    pub source_dir: Option<PathBuf>,

    /// File name of the IP-range dataset inside `data_dir`.
    pub ranges_file: String,

    /// File name of the exchange-rate dataset inside `data_dir`.
    pub rates_file: String,

    /// File name of the refresh metadata inside `data_dir`.
    pub metadata_file: String,

    /// Whether the freshness scheduler runs at all.
    pub auto_refresh: bool,

    /// Refresh period in minutes (minimum 1).
    pub refresh_period_minutes: i64,

    /// Base currency used when a lookup does not request one.
    pub base_currency: String,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./geopulse_data"),
            source_dir: None,
            ranges_file: RANGES_FILE.to_string(),
            rates_file: RATES_FILE.to_string(),
            metadata_file: METADATA_FILE.to_string(),
            auto_refresh: true,
            refresh_period_minutes: 24 * 60,
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    /// Checks constraints that must hold before any scheduler starts.
    pub fn validate(&self) -> Result<(), GeoPulseError> {
        if self.refresh_period_minutes < 1 {
            return Err(GeoPulseError::InvalidConfiguration(format!(
                "refresh period must be >= 1 minute, got {}",
                self.refresh_period_minutes
            )));
        }
        Ok(())
    }

    /// Full path of the IP-range dataset file.
    pub fn ranges_path(&self) -> PathBuf {
        self.data_dir.join(&self.ranges_file)
    }

    /// Full path of the exchange-rate dataset file.
    pub fn rates_path(&self) -> PathBuf {
        self.data_dir.join(&self.rates_file)
    }

    /// Full path of the refresh metadata file.
    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join(&self.metadata_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.ranges_file, "ip-ranges.json");
        assert_eq!(config.rates_file, "exchange-rates.json");
        assert_eq!(config.metadata_file, "metadata.json");
        assert_eq!(config.refresh_period_minutes, 1440);
        assert_eq!(config.base_currency, "USD");
        assert!(config.auto_refresh);
    }

    #[test]
    fn test_validate_rejects_sub_minute_period() {
        let config = Config {
            refresh_period_minutes: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GeoPulseError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_validate_accepts_one_minute_period() {
        let config = Config {
            refresh_period_minutes: 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_paths_join_data_dir() {
        let config = Config {
            data_dir: PathBuf::from("/var/lib/geopulse"),
            ..Default::default()
        };
        assert_eq!(
            config.ranges_path(),
            PathBuf::from("/var/lib/geopulse/ip-ranges.json")
        );
        assert_eq!(
            config.metadata_path(),
            PathBuf::from("/var/lib/geopulse/metadata.json")
        );
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }
}
