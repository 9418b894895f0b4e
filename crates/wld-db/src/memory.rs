//! In-memory [`CountryStore`] for scenario tests (testkit feature only).
//!
//! Semantics mirror the Postgres store: one record per name, upsert on the
//! insert path, insertion order preserved so "first record in dataset
//! order" behaves the same as the `order by id` query.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use wld_schemas::CountryRecord;

use crate::{CountryStore, ListFilter, SortOrder};

#[derive(Debug, Default)]
pub struct MemoryCountryStore {
    records: RwLock<Vec<CountryRecord>>,
}

impl MemoryCountryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store outside the trait surface.
    pub async fn seed(&self, records: Vec<CountryRecord>) {
        let mut guard = self.records.write().await;
        *guard = records;
    }
}

#[async_trait]
impl CountryStore for MemoryCountryStore {
    async fn get_all(&self, filter: &ListFilter) -> Result<Vec<CountryRecord>> {
        let guard = self.records.read().await;
        let mut out: Vec<CountryRecord> = guard
            .iter()
            .filter(|r| {
                filter
                    .region
                    .as_deref()
                    .map_or(true, |region| r.region == region)
            })
            .filter(|r| {
                filter
                    .currency
                    .as_deref()
                    .map_or(true, |code| r.currency_code.as_deref() == Some(code))
            })
            .cloned()
            .collect();

        if filter.sort == Some(SortOrder::GdpDesc) {
            // Stable sort, GDP-less records last.
            out.sort_by(|a, b| match (b.estimated_gdp, a.estimated_gdp) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
                (Some(_), None) => std::cmp::Ordering::Greater,
                (None, Some(_)) => std::cmp::Ordering::Less,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }

        Ok(out)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<CountryRecord>> {
        let guard = self.records.read().await;
        Ok(guard.iter().find(|r| r.name == name).cloned())
    }

    async fn apply_refresh(
        &self,
        to_insert: &[CountryRecord],
        to_update: &[CountryRecord],
    ) -> Result<()> {
        let mut guard = self.records.write().await;
        for rec in to_insert {
            match guard.iter_mut().find(|r| r.name == rec.name) {
                Some(existing) => *existing = rec.clone(),
                None => guard.push(rec.clone()),
            }
        }
        for rec in to_update {
            if let Some(existing) = guard.iter_mut().find(|r| r.name == rec.name) {
                *existing = rec.clone();
            }
        }
        Ok(())
    }

    async fn delete_by_name(&self, name: &str) -> Result<bool> {
        let mut guard = self.records.write().await;
        let before = guard.len();
        guard.retain(|r| r.name != name);
        Ok(guard.len() < before)
    }

    async fn count(&self) -> Result<i64> {
        let guard = self.records.read().await;
        Ok(guard.len() as i64)
    }
}
