//! On-disk JSON persistence for datasets, exchange rates, and refresh metadata.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::geo::types::RangeRecord;
use crate::geo::ExchangeRateTable;

/// The single piece of persisted state driving scheduling decisions.
///
/// Written only by the scheduler, after a refresh completes successfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshMetadata {
    /// When the last successful refresh finished (ISO-8601 on disk).
    #[serde(rename = "lastRun")]
    pub last_run: DateTime<Utc>,
}

/// Reads and parses a JSON file.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(value)
}

/// Loads the IP-range dataset.
pub async fn load_ranges(path: &Path) -> Result<Vec<RangeRecord>> {
    read_json(path).await
}

/// Loads the exchange-rate dataset.
pub async fn load_rates(path: &Path) -> Result<ExchangeRateTable> {
    read_json(path).await
}

/// Loads refresh metadata. Callers treat an absent or unparseable file as
/// "never refreshed".
pub async fn load_metadata(path: &Path) -> Result<RefreshMetadata> {
    read_json(path).await
}

/// Saves refresh metadata.
pub async fn save_metadata(metadata: &RefreshMetadata, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(metadata)?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
