//! Data structures for range records, reference data, and lookup results.

use serde::{Deserialize, Serialize};

/// ASN details attached to a range record, passed through to results unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsnInfo {
    /// Autonomous system number.
    pub id: u32,
    /// Organization name.
    pub name: String,
    /// Announced prefix in CIDR notation.
    pub cidr: String,
    /// Registration country code.
    pub country: String,
}

/// One contiguous, inclusive address interval known to belong to one country.
///
/// Immutable once loaded; the dataset is replaced wholesale on refresh, never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeRecord {
    /// First address of the interval, textual IPv4 or IPv6.
    pub start: String,
    /// Last address of the interval, inclusive.
    pub end: String,
    /// ISO country code the interval belongs to.
    pub country: String,
    /// Optional ASN details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asn: Option<AsnInfo>,
}

/// Currency descriptor from the bundled reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    /// ISO-4217 code.
    pub code: String,
    /// English currency name.
    pub name: String,
    /// Currency symbol.
    pub symbol: String,
}

/// Static country reference data, loaded once from the bundled table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryEntity {
    /// ISO-3166 alpha-2 code.
    pub code: String,
    /// English country name.
    pub name: String,
    /// Capital city.
    pub capital: String,
    /// Continent name.
    pub continent: String,
    /// International calling code, e.g. `"+40"`.
    pub calling_code: String,
    /// Whether the country is an EU member.
    pub is_in_eu: bool,
    /// Primary language code.
    pub language: String,
    /// Flag emoji.
    pub flag: String,
    /// National currency.
    pub currency: CurrencyInfo,
}

/// Exchange rate of the matched country's currency relative to a base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    /// The currency the rate is expressed against.
    pub base_currency: String,
    /// Country-currency units per one unit of base currency, 5 decimals.
    pub rate: f64,
}

/// Per-query lookup output. Constructed fresh per lookup, never cached.
///
/// Optional fields are genuinely optional — absent data is omitted rather
/// than filled with placeholder values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpGeoResult {
    /// The queried address, echoed back.
    pub ip: String,
    /// Country reference entry for the matched range.
    pub country: CountryEntity,
    /// Exchange rate, present only when both currencies have known rates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<ExchangeRate>,
    /// ASN details, present when the matched range carried them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asn: Option<AsnInfo>,
}
