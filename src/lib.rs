//! geopulse library: IP-to-country/currency resolution over refreshable
//! range datasets.
//!
//! A [`GeoPulse`] instance owns an immutable snapshot of sorted IP-range
//! intervals and answers lookups by binary search; a [`FreshnessScheduler`]
//! keeps the on-disk dataset fresh through an injected [`Refresher`]
//! capability and swaps the snapshot wholesale after each successful refresh.
//!
//! # Example
//!
//! ```no_run
//! use geopulse::{Config, GeoPulse};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let service = GeoPulse::with_local_source(Config {
//!     source_dir: Some("../datasets".into()),
//!     ..config
//! })?;
//!
//! match service.lookup("80.65.220.23", Some("USD")).await {
//!     Some(result) => println!("{} ({})", result.country.name, result.country.code),
//!     None => println!("no match"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime for file IO and scheduling.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod geo;
pub mod logging;
pub mod refresh;
pub mod scheduler;
pub mod service;
pub mod store;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error::GeoPulseError;
pub use geo::{AsnInfo, CountryEntity, CurrencyInfo, ExchangeRate, IpGeoResult, RangeRecord};
pub use refresh::{LocalCopyRefresher, Refresher};
pub use scheduler::FreshnessScheduler;
pub use service::GeoPulse;
