//! Insert-vs-update classification for one refresh.
//!
//! The caller captures the full set of persisted names in a single bulk
//! read before classification starts; once `reconcile` runs there are no
//! further existence checks against storage. That one bulk read is the
//! reason a refresh issues a single query instead of one per country.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rand::RngCore;
use wld_schemas::{CountryRecord, ExchangeRates, RawCountry};

use crate::gdp::estimate_gdp;

/// Output of classification: what to create and what to overwrite.
/// Both vectors preserve the order of the incoming payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshPlan {
    pub to_insert: Vec<CountryRecord>,
    pub to_update: Vec<CountryRecord>,
}

impl RefreshPlan {
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_update.is_empty()
    }
}

/// Classify `incoming` against the point-in-time snapshot `existing_names`.
///
/// Every incoming country becomes a [`CountryRecord`] stamped with
/// `refreshed_at`; its currency/rate/GDP fields follow the estimator rules
/// (rate and GDP jointly present, never without a code). Pure function:
/// deterministic given a pinned `rng`.
pub fn reconcile(
    existing_names: &BTreeSet<String>,
    incoming: &[RawCountry],
    rates: &ExchangeRates,
    refreshed_at: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> RefreshPlan {
    let mut plan = RefreshPlan::default();

    for country in incoming {
        let record = build_record(country, rates, refreshed_at, rng);
        if existing_names.contains(&record.name) {
            plan.to_update.push(record);
        } else {
            plan.to_insert.push(record);
        }
    }

    plan
}

fn build_record(
    country: &RawCountry,
    rates: &ExchangeRates,
    refreshed_at: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> CountryRecord {
    let currency_code = country.primary_currency_code().map(str::to_string);
    let exchange_rate = currency_code
        .as_deref()
        .and_then(|code| rates.usable_rate(code));
    // The rate lookup above already filtered unusable rates, so the estimate
    // is present exactly when the rate is.
    let estimated_gdp = estimate_gdp(country.population, currency_code.as_deref(), rates, rng);

    CountryRecord {
        name: country.name.clone(),
        capital: country.capital.clone(),
        region: country.region.clone(),
        population: country.population,
        currency_code,
        exchange_rate,
        estimated_gdp,
        flag_url: country.flag.clone(),
        last_refreshed_at: refreshed_at,
    }
}
