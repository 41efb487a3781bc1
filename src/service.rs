//! The lookup service instance.
//!
//! Each `GeoPulse` instance exclusively owns its in-memory snapshot (range
//! index plus exchange rates). A refresh replaces the snapshot pointer rather
//! than mutating shared structures, so concurrent lookups never observe a
//! partially-updated index.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::config::Config;
use crate::error::GeoPulseError;
use crate::geo::enrich::{self, CountryTable, ExchangeRateTable};
use crate::geo::types::IpGeoResult;
use crate::geo::RangeIndex;
use crate::refresh::{LocalCopyRefresher, Refresher};
use crate::store;

/// Immutable dataset snapshot shared read-only across lookups.
struct Snapshot {
    index: RangeIndex,
    rates: Option<ExchangeRateTable>,
}

/// IP-to-country/currency lookup service.
///
/// # Examples
///
/// ```no_run
/// use geopulse::{Config, GeoPulse};
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config {
///     data_dir: PathBuf::from("./geopulse_data"),
///     source_dir: Some(PathBuf::from("../datasets")),
///     ..Default::default()
/// };
/// let service = GeoPulse::with_local_source(config)?;
/// if let Some(result) = service.lookup("80.65.220.23", None).await {
///     println!("{}", result.country.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct GeoPulse {
    config: Config,
    countries: &'static CountryTable,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    refresher: Arc<dyn Refresher>,
    // Serializes refreshes: at most one in flight at a time.
    refresh_guard: Mutex<()>,
}

impl GeoPulse {
    /// Creates a service with an injected refresher.
    pub fn new(config: Config, refresher: Arc<dyn Refresher>) -> Result<Self, GeoPulseError> {
        config.validate()?;
        Ok(GeoPulse {
            config,
            countries: CountryTable::bundled(),
            snapshot: RwLock::new(None),
            refresher,
            refresh_guard: Mutex::new(()),
        })
    }

    /// Creates a service whose refresher copies dataset files from
    /// `config.source_dir`.
    pub fn with_local_source(config: Config) -> Result<Self, GeoPulseError> {
        let source_dir = config.source_dir.clone().ok_or_else(|| {
            GeoPulseError::InvalidConfiguration("source directory is not set".into())
        })?;
        let refresher = Arc::new(LocalCopyRefresher::from_config(&config, source_dir));
        GeoPulse::new(config, refresher)
    }

    /// The service configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves an IP address to its country/currency record.
    ///
    /// Returns `None` for a malformed address, an address outside every known
    /// range, a range pointing to an unknown country code, or when no dataset
    /// is readable yet. Never errors across this boundary; keeping the
    /// dataset present is the scheduler's job, not the lookup path's.
    pub async fn lookup(&self, ip: &str, base_currency: Option<&str>) -> Option<IpGeoResult> {
        let snapshot = match self.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::debug!("{e}");
                return None;
            }
        };
        let record = snapshot.index.find(ip)?;
        let base = base_currency.unwrap_or(&self.config.base_currency);
        enrich::resolve(ip, record, self.countries, snapshot.rates.as_ref(), base)
    }

    /// Drops the in-memory snapshot so the next lookup rebuilds it from the
    /// freshly written files.
    pub async fn invalidate(&self) {
        *self.snapshot.write().await = None;
        log::debug!("dataset snapshot invalidated");
    }

    /// Runs the injected refresher. Serialized: a second caller waits until
    /// the in-flight refresh completes.
    pub async fn refresh(&self, only_missing: bool) -> Result<(), GeoPulseError> {
        let _guard = self.refresh_guard.lock().await;
        self.refresher
            .refresh(only_missing)
            .await
            .map_err(GeoPulseError::RefreshFailed)
    }

    /// Returns the current snapshot, loading it from disk on first use.
    ///
    /// A missing or unreadable ranges file yields
    /// [`GeoPulseError::DataUnavailable`]; a missing rates file only disables
    /// exchange-rate enrichment. The last successfully loaded snapshot stays
    /// in place until [`invalidate`] replaces it.
    ///
    /// [`invalidate`]: GeoPulse::invalidate
    async fn snapshot(&self) -> Result<Arc<Snapshot>, GeoPulseError> {
        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let mut slot = self.snapshot.write().await;
        // Another lookup may have loaded it while we waited for the lock
        if let Some(snapshot) = slot.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let ranges_path = self.config.ranges_path();
        let ranges = match store::load_ranges(&ranges_path).await {
            Ok(ranges) => ranges,
            Err(e) => {
                log::debug!("failed to load ranges: {e:#}");
                return Err(GeoPulseError::DataUnavailable(ranges_path));
            }
        };

        let rates = match store::load_rates(&self.config.rates_path()).await {
            Ok(rates) => Some(rates),
            Err(e) => {
                log::debug!("exchange rates unavailable: {e:#}");
                None
            }
        };

        let index = RangeIndex::build(ranges);
        log::info!("range index built: {} ranges", index.len());
        let snapshot = Arc::new(Snapshot { index, rates });
        *slot = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }
}
