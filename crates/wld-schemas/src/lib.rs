//! Shared data model for the WorldLedger service.
//!
//! Upstream payload shapes (`RawCountry`, `ExchangeRates`) live next to the
//! persisted row shape (`CountryRecord`) and the summary projection so that
//! every crate in the workspace agrees on one vocabulary. No I/O here.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A currency descriptor as supplied by the countries API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCurrency {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

/// One country exactly as the upstream countries API returns it.
///
/// Immutable once fetched; lives only for the duration of a single refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCountry {
    pub name: String,
    #[serde(default)]
    pub capital: String,
    #[serde(default)]
    pub region: String,
    pub population: u64,
    /// Ordered; may be empty. The first entry decides the stored code.
    #[serde(default)]
    pub currencies: Vec<RawCurrency>,
    /// Flag image URL.
    #[serde(default)]
    pub flag: String,
}

impl RawCountry {
    /// Code of the first listed currency, if the country has one.
    pub fn primary_currency_code(&self) -> Option<&str> {
        self.currencies.first().map(|c| c.code.as_str())
    }
}

/// Exchange-rate table from the rates API.
///
/// Only `rates` is consumed by the pipeline; the provider metadata is kept
/// because it arrives in the same payload and is occasionally useful in logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExchangeRates {
    #[serde(default)]
    pub base_code: String,
    #[serde(default)]
    pub time_last_update_unix: i64,
    #[serde(default)]
    pub time_last_update_utc: String,
    /// Currency code -> local units per reference unit.
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

impl ExchangeRates {
    /// Table with no rates at all. Used when the rates fetch fails and the
    /// refresh proceeds with every GDP estimate absent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rate for `code`, treating a zero rate as unavailable so no caller can
    /// divide by it.
    pub fn usable_rate(&self, code: &str) -> Option<f64> {
        match self.rates.get(code) {
            Some(r) if *r != 0.0 => Some(*r),
            _ => None,
        }
    }
}

/// The persisted per-country row.
///
/// Invariants:
/// - at most one record per `name` (unique key in storage);
/// - `exchange_rate` and `estimated_gdp` are jointly present, and never
///   present without `currency_code`. A record may carry a code with no
///   rate/GDP when the rate table lacked that code at refresh time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub name: String,
    pub capital: String,
    pub region: String,
    pub population: u64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: String,
    pub last_refreshed_at: DateTime<Utc>,
}

/// One entry of the top-by-GDP list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GdpEntry {
    pub name: String,
    pub estimated_gdp: f64,
}

/// Aggregate view of the dataset used to render the summary artifact.
///
/// Recomputed from scratch on every refresh; never persisted beyond the
/// rendered artifact itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySummary {
    pub total_countries: usize,
    /// Descending by estimated GDP, ties in dataset order, at most 5.
    pub top_by_gdp: Vec<GdpEntry>,
    pub last_refreshed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_currency_code_is_first_listed() {
        let country = RawCountry {
            name: "Zimbabwe".to_string(),
            capital: "Harare".to_string(),
            region: "Africa".to_string(),
            population: 14_862_924,
            currencies: vec![
                RawCurrency {
                    code: "ZWL".to_string(),
                    name: "Zimbabwean dollar".to_string(),
                    symbol: "$".to_string(),
                },
                RawCurrency {
                    code: "USD".to_string(),
                    name: "United States dollar".to_string(),
                    symbol: "$".to_string(),
                },
            ],
            flag: String::new(),
        };
        assert_eq!(country.primary_currency_code(), Some("ZWL"));
    }

    #[test]
    fn primary_currency_code_none_when_empty() {
        let country = RawCountry {
            name: "Antarctica".to_string(),
            capital: String::new(),
            region: "Polar".to_string(),
            population: 0,
            currencies: vec![],
            flag: String::new(),
        };
        assert_eq!(country.primary_currency_code(), None);
    }

    #[test]
    fn usable_rate_rejects_zero_and_missing() {
        let mut rates = ExchangeRates::empty();
        rates.rates.insert("EUR".to_string(), 0.9);
        rates.rates.insert("XXX".to_string(), 0.0);

        assert_eq!(rates.usable_rate("EUR"), Some(0.9));
        assert_eq!(rates.usable_rate("XXX"), None);
        assert_eq!(rates.usable_rate("JPY"), None);
    }

    #[test]
    fn raw_country_decodes_upstream_shape() {
        let payload = r#"{
            "name": "France",
            "capital": "Paris",
            "region": "Europe",
            "population": 67000000,
            "currencies": [{"code": "EUR", "name": "Euro", "symbol": "€"}],
            "flag": "https://flagcdn.com/fr.svg"
        }"#;
        let country: RawCountry = serde_json::from_str(payload).unwrap();
        assert_eq!(country.name, "France");
        assert_eq!(country.primary_currency_code(), Some("EUR"));
    }

    #[test]
    fn raw_country_tolerates_missing_optional_fields() {
        let payload = r#"{"name": "Atlantis", "population": 0}"#;
        let country: RawCountry = serde_json::from_str(payload).unwrap();
        assert!(country.currencies.is_empty());
        assert_eq!(country.capital, "");
    }
}
