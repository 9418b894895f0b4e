//! wld-sources
//!
//! Upstream adapters for the two external data feeds: the countries API and
//! the exchange-rates API. This crate owns the feed traits and the
//! reqwest-backed implementations; it does not touch the database. Callers
//! (the daemon) fetch payloads here and hand them to wld-reconcile.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use wld_schemas::{ExchangeRates, RawCountry};

pub const ENV_COUNTRIES_API_URL: &str = "WLD_COUNTRIES_API_URL";
pub const ENV_RATES_API_URL: &str = "WLD_RATES_API_URL";

/// Upstream source of the country list.
#[async_trait]
pub trait CountryFeed: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Fetch and decode the full country list. Transport failures and
    /// malformed payloads are both errors; the refresh aborts on either.
    async fn fetch_countries(&self) -> Result<Vec<RawCountry>>;
}

/// Upstream source of the exchange-rate table.
#[async_trait]
pub trait RateFeed: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Fetch and decode the rate table. Callers treat failure here as
    /// non-fatal and continue with [`ExchangeRates::empty`].
    async fn fetch_rates(&self) -> Result<ExchangeRates>;
}

/// REST countries feed hitting a configurable endpoint URL.
#[derive(Debug, Clone)]
pub struct RestCountriesFeed {
    http: reqwest::Client,
    url: String,
}

impl RestCountriesFeed {
    pub fn new(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }

    pub fn from_env() -> Result<Self> {
        let url = std::env::var(ENV_COUNTRIES_API_URL)
            .with_context(|| format!("missing env var {ENV_COUNTRIES_API_URL}"))?;
        Ok(Self::new(url))
    }
}

#[async_trait]
impl CountryFeed for RestCountriesFeed {
    fn source_name(&self) -> &'static str {
        "restcountries"
    }

    async fn fetch_countries(&self) -> Result<Vec<RawCountry>> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("countries request failed")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!(
                "countries api http error status={}",
                status.as_u16()
            ));
        }

        let countries: Vec<RawCountry> = resp
            .json()
            .await
            .context("countries response json decode failed")?;

        Ok(countries)
    }
}

/// Exchange-rates feed hitting a configurable endpoint URL.
#[derive(Debug, Clone)]
pub struct OpenRatesFeed {
    http: reqwest::Client,
    url: String,
}

impl OpenRatesFeed {
    pub fn new(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }

    pub fn from_env() -> Result<Self> {
        let url = std::env::var(ENV_RATES_API_URL)
            .with_context(|| format!("missing env var {ENV_RATES_API_URL}"))?;
        Ok(Self::new(url))
    }
}

#[async_trait]
impl RateFeed for OpenRatesFeed {
    fn source_name(&self) -> &'static str {
        "open-exchange-rates"
    }

    async fn fetch_rates(&self) -> Result<ExchangeRates> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("rates request failed")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("rates api http error status={}", status.as_u16()));
        }

        let rates: ExchangeRates = resp
            .json()
            .await
            .context("rates response json decode failed")?;

        Ok(rates)
    }
}
