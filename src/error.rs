//! Error types for the lookup engine and the refresh scheduler.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the geopulse core.
///
/// Encoding and lookup failures never cross the lookup API boundary — they
/// degrade to a "no match" result. Refresh failures are reported to the
/// scheduler's caller and retried on the next tick.
#[derive(Error, Debug)]
pub enum GeoPulseError {
    /// The input IP string cannot be encoded as an address.
    #[error("malformed address {addr:?}: {reason}")]
    MalformedAddress {
        /// The offending input string.
        addr: String,
        /// What made it unparseable.
        reason: String,
    },

    /// A dataset file could not be read (first run before any refresh, or
    /// the file was deleted).
    #[error("dataset unavailable: {0}")]
    DataUnavailable(PathBuf),

    /// The injected refresh callback failed (network/auth/decoding failure
    /// inside the collaborator).
    #[error("refresh failed: {0}")]
    RefreshFailed(#[source] anyhow::Error),

    /// Rejected at scheduler construction, before any timer starts.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl GeoPulseError {
    pub(crate) fn malformed(addr: &str, reason: impl Into<String>) -> Self {
        GeoPulseError::MalformedAddress {
            addr: addr.to_string(),
            reason: reason.into(),
        }
    }
}
