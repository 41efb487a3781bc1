//! End-to-end lookup scenarios against datasets on disk.

use std::path::Path;

use tempfile::TempDir;

use geopulse::{Config, GeoPulse};

fn write_dataset(dir: &Path) {
    std::fs::write(
        dir.join("ip-ranges.json"),
        r#"[
            {"start": "80.65.220.0", "end": "80.65.223.255", "country": "RO"},
            {"start": "2001:db8::", "end": "2001:db8::ffff", "country": "DE",
             "asn": {"id": 3320, "name": "Deutsche Telekom", "cidr": "2001:db8::/112", "country": "DE"}}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("exchange-rates.json"),
        r#"{"EUR": 1, "USD": 0.92, "RON": 4.45}"#,
    )
    .unwrap();
}

fn service_in(dir: &TempDir) -> GeoPulse {
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        source_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    GeoPulse::with_local_source(config).unwrap()
}

#[tokio::test]
async fn lookup_inside_range_resolves_country_and_rate() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let service = service_in(&dir);

    let result = service.lookup("80.65.220.23", Some("USD")).await.unwrap();
    assert_eq!(result.ip, "80.65.220.23");
    assert_eq!(result.country.code, "RO");
    assert_eq!(result.country.capital, "Bucharest");
    assert_eq!(result.country.currency.code, "RON");

    // 4.45 / 0.92 rounded to 5 decimals
    let exchange = result.exchange_rate.unwrap();
    assert_eq!(exchange.base_currency, "USD");
    assert_eq!(exchange.rate, 4.83696);
}

#[tokio::test]
async fn lookup_outside_every_range_is_no_match() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let service = service_in(&dir);

    assert!(service.lookup("80.65.224.1", None).await.is_none());
    assert!(service.lookup("8.8.8.8", None).await.is_none());
}

#[tokio::test]
async fn lookup_ipv6_with_asn_passthrough() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let service = service_in(&dir);

    let result = service.lookup("2001:db8::42", None).await.unwrap();
    assert_eq!(result.country.code, "DE");
    let asn = result.asn.unwrap();
    assert_eq!(asn.id, 3320);
    assert_eq!(asn.name, "Deutsche Telekom");

    assert!(service.lookup("2001:db9::1", None).await.is_none());
}

#[tokio::test]
async fn lookup_malformed_address_is_no_match_not_an_error() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let service = service_in(&dir);

    for addr in ["not-an-ip", "300.1.2.3", "1.2.3", "1::2::3", ""] {
        assert!(
            service.lookup(addr, None).await.is_none(),
            "expected no match for {addr:?}"
        );
    }
}

#[tokio::test]
async fn lookup_defaults_to_usd_base_currency() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let service = service_in(&dir);

    let result = service.lookup("80.65.220.23", None).await.unwrap();
    assert_eq!(result.exchange_rate.unwrap().base_currency, "USD");
}

#[tokio::test]
async fn lookup_with_eur_base_currency() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let service = service_in(&dir);

    let result = service.lookup("80.65.220.23", Some("EUR")).await.unwrap();
    assert_eq!(result.exchange_rate.unwrap().rate, 4.45);
}

#[tokio::test]
async fn lookup_with_unknown_base_currency_omits_rate() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let service = service_in(&dir);

    let result = service.lookup("80.65.220.23", Some("XYZ")).await.unwrap();
    assert_eq!(result.country.code, "RO");
    assert!(result.exchange_rate.is_none());
}

#[tokio::test]
async fn lookup_result_serializes_with_camel_case_schema() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let service = service_in(&dir);

    let result = service.lookup("80.65.220.23", Some("USD")).await.unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["ip"], "80.65.220.23");
    assert_eq!(json["country"]["code"], "RO");
    assert_eq!(json["country"]["isInEu"], true);
    assert_eq!(json["exchangeRate"]["baseCurrency"], "USD");
    assert_eq!(json["exchangeRate"]["rate"], 4.83696);
}
