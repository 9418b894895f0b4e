//! Estimated-GDP derivation.
//!
//! The estimate is `population * multiplier / rate` with the multiplier
//! drawn uniformly from 1000..=2000 per country per refresh. The draw is
//! intentionally part of the observable behavior: re-running a refresh with
//! identical source data yields different figures. Callers supply the rng
//! so tests can seed it.

use rand::{Rng, RngCore};
use wld_schemas::ExchangeRates;

/// Inclusive bounds of the per-country multiplier draw.
pub const MULTIPLIER_MIN: u64 = 1000;
pub const MULTIPLIER_MAX: u64 = 2000;

/// Derive an estimated GDP for one country.
///
/// Returns `None` when the country has no currency code, the code has no
/// entry in `rates`, or the listed rate is zero (a zero rate is treated as
/// unavailable rather than producing an infinite estimate).
pub fn estimate_gdp(
    population: u64,
    currency_code: Option<&str>,
    rates: &ExchangeRates,
    rng: &mut dyn RngCore,
) -> Option<f64> {
    let code = currency_code?;
    let rate = rates.usable_rate(code)?;
    let multiplier = rng.gen_range(MULTIPLIER_MIN..=MULTIPLIER_MAX);
    Some(population as f64 * multiplier as f64 / rate)
}
