//! IP range lookup engine.
//!
//! Encoding of textual addresses into ordered integer keys, construction of
//! per-family sorted range indexes, binary-search lookup, and enrichment of a
//! match with country/currency reference data.

pub mod codec;
pub mod enrich;
pub mod index;
pub mod types;

pub use enrich::{CountryTable, ExchangeRateTable};
pub use index::RangeIndex;
pub use types::{AsnInfo, CountryEntity, CurrencyInfo, ExchangeRate, IpGeoResult, RangeRecord};
