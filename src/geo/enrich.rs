//! Enrichment of a matched range with country and currency data.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::geo::types::{CountryEntity, ExchangeRate, IpGeoResult, RangeRecord};

/// Mapping from ISO-4217 currency code to a EUR-relative rate (`"EUR": 1`).
///
/// Replaced wholesale on each refresh, never patched incrementally.
pub type ExchangeRateTable = HashMap<String, f64>;

/// Static country reference table, keyed by ISO code.
pub struct CountryTable {
    entries: HashMap<String, CountryEntity>,
}

/// Bundled reference table, parsed once on first use.
static BUNDLED: LazyLock<CountryTable> = LazyLock::new(|| {
    let entries: Vec<CountryEntity> = serde_json::from_str(include_str!("../../data/countries.json"))
        .expect("bundled countries.json is valid");
    CountryTable::from_entries(entries)
});

impl CountryTable {
    /// The reference table bundled with the crate.
    pub fn bundled() -> &'static CountryTable {
        &BUNDLED
    }

    /// Builds a table from explicit entries (used by tests).
    pub fn from_entries(entries: Vec<CountryEntity>) -> Self {
        CountryTable {
            entries: entries.into_iter().map(|c| (c.code.clone(), c)).collect(),
        }
    }

    /// O(1) lookup by ISO country code.
    pub fn get(&self, code: &str) -> Option<&CountryEntity> {
        self.entries.get(code)
    }

    /// Number of countries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Computes the rate of `country_currency` relative to `base_currency`,
/// rounded to 5 decimal places.
///
/// Returns `None` when either currency is absent from the table; the caller
/// omits the exchange-rate field rather than fabricating a neutral rate.
pub fn compute_rate(
    rates: &ExchangeRateTable,
    country_currency: &str,
    base_currency: &str,
) -> Option<f64> {
    let country_rate = rates.get(country_currency)?;
    let base_rate = rates.get(base_currency)?;
    if *base_rate == 0.0 {
        return None;
    }
    Some((country_rate / base_rate * 1e5).round() / 1e5)
}

/// Assembles the per-query result for a matched range.
///
/// An unknown country code yields `None`: a range pointing outside the
/// reference table is treated as no match, not a partial result. The ASN
/// sub-record, when present, passes through unchanged.
pub fn resolve(
    ip: &str,
    record: &RangeRecord,
    countries: &CountryTable,
    rates: Option<&ExchangeRateTable>,
    base_currency: &str,
) -> Option<IpGeoResult> {
    let country = countries.get(&record.country)?.clone();

    let exchange_rate = rates
        .and_then(|rates| compute_rate(rates, &country.currency.code, base_currency))
        .map(|rate| ExchangeRate {
            base_currency: base_currency.to_string(),
            rate,
        });

    Some(IpGeoResult {
        ip: ip.to_string(),
        country,
        exchange_rate,
        asn: record.asn.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> ExchangeRateTable {
        let mut table = ExchangeRateTable::new();
        table.insert("EUR".to_string(), 1.0);
        table.insert("USD".to_string(), 0.92);
        table.insert("RON".to_string(), 4.45);
        table
    }

    fn ro_record() -> RangeRecord {
        RangeRecord {
            start: "80.65.220.0".into(),
            end: "80.65.223.255".into(),
            country: "RO".into(),
            asn: None,
        }
    }

    #[test]
    fn test_bundled_table_loads() {
        let table = CountryTable::bundled();
        assert!(!table.is_empty());
        let ro = table.get("RO").unwrap();
        assert_eq!(ro.name, "Romania");
        assert_eq!(ro.currency.code, "RON");
        assert!(ro.is_in_eu);
        assert!(table.get("XX").is_none());
    }

    #[test]
    fn test_compute_rate_five_decimals() {
        // 4.45 / 0.92 = 4.836956..., rounded to 5 decimals
        let rate = compute_rate(&rates(), "RON", "USD").unwrap();
        assert_eq!(rate, 4.83696);
    }

    #[test]
    fn test_compute_rate_eur_base() {
        assert_eq!(compute_rate(&rates(), "RON", "EUR").unwrap(), 4.45);
        assert_eq!(compute_rate(&rates(), "EUR", "EUR").unwrap(), 1.0);
    }

    #[test]
    fn test_compute_rate_missing_currency() {
        assert!(compute_rate(&rates(), "XYZ", "USD").is_none());
        assert!(compute_rate(&rates(), "RON", "XYZ").is_none());
    }

    #[test]
    fn test_resolve_attaches_exchange_rate() {
        let rates = rates();
        let result = resolve(
            "80.65.220.23",
            &ro_record(),
            CountryTable::bundled(),
            Some(&rates),
            "USD",
        )
        .unwrap();
        assert_eq!(result.ip, "80.65.220.23");
        assert_eq!(result.country.code, "RO");
        let exchange = result.exchange_rate.unwrap();
        assert_eq!(exchange.base_currency, "USD");
        assert_eq!(exchange.rate, 4.83696);
    }

    #[test]
    fn test_resolve_omits_rate_when_unavailable() {
        // No rate table at all
        let result = resolve(
            "80.65.220.23",
            &ro_record(),
            CountryTable::bundled(),
            None,
            "USD",
        )
        .unwrap();
        assert!(result.exchange_rate.is_none());

        // Base currency missing from the table
        let mut partial = ExchangeRateTable::new();
        partial.insert("RON".to_string(), 4.45);
        let result = resolve(
            "80.65.220.23",
            &ro_record(),
            CountryTable::bundled(),
            Some(&partial),
            "USD",
        )
        .unwrap();
        assert!(result.exchange_rate.is_none());
    }

    #[test]
    fn test_resolve_unknown_country_is_no_match() {
        let record = RangeRecord {
            country: "ZZ".into(),
            ..ro_record()
        };
        let result = resolve(
            "80.65.220.23",
            &record,
            CountryTable::bundled(),
            None,
            "USD",
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_resolve_passes_asn_through() {
        use crate::geo::types::AsnInfo;
        let record = RangeRecord {
            asn: Some(AsnInfo {
                id: 8953,
                name: "Orange Romania".into(),
                cidr: "80.65.220.0/22".into(),
                country: "RO".into(),
            }),
            ..ro_record()
        };
        let result = resolve(
            "80.65.220.23",
            &record,
            CountryTable::bundled(),
            None,
            "USD",
        )
        .unwrap();
        assert_eq!(result.asn.unwrap().id, 8953);
    }
}
