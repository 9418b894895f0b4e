//! wld-db
//!
//! Persistence gateway for the `countries` record set. The [`CountryStore`]
//! trait is the only surface the daemon sees; [`PgCountryStore`] is the
//! production Postgres implementation, and the `testkit` feature adds an
//! in-memory stand-in for scenario tests.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use wld_schemas::CountryRecord;

#[cfg(feature = "testkit")]
mod memory;
#[cfg(feature = "testkit")]
pub use memory::MemoryCountryStore;

pub const ENV_DB_URL: &str = "WLD_DATABASE_URL";

/// Connect to Postgres using WLD_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    let url =
        std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Optional narrowing of a list query.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    GdpDesc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gdp_desc" => Some(SortOrder::GdpDesc),
            _ => None,
        }
    }
}

/// CRUD contract over the persisted country dataset.
///
/// Batch operations are atomic per refresh: `apply_refresh` wraps the insert
/// batch and the update batch in a single transaction so a mid-batch failure
/// never leaves half a refresh behind.
#[async_trait]
pub trait CountryStore: Send + Sync {
    /// Full dataset in stable storage order (insertion order for Postgres).
    async fn get_all(&self, filter: &ListFilter) -> Result<Vec<CountryRecord>>;

    /// Single record, or `None` when the name is unknown.
    async fn get_by_name(&self, name: &str) -> Result<Option<CountryRecord>>;

    /// Persist one refresh: create `to_insert`, overwrite `to_update`.
    /// Inserts upsert on the unique name key, so a concurrent refresh that
    /// classified the same new country degrades to an update instead of a
    /// duplicate-row failure.
    async fn apply_refresh(
        &self,
        to_insert: &[CountryRecord],
        to_update: &[CountryRecord],
    ) -> Result<()>;

    /// Delete by name. `false` when no record matched.
    async fn delete_by_name(&self, name: &str) -> Result<bool>;

    async fn count(&self) -> Result<i64>;
}

/// Postgres-backed [`CountryStore`].
#[derive(Debug, Clone)]
pub struct PgCountryStore {
    pool: PgPool,
}

impl PgCountryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const SELECT_COLUMNS: &str = "name, capital, region, population, currency_code, \
     exchange_rate, estimated_gdp, flag_url, last_refreshed_at";

fn row_to_record(row: &PgRow) -> Result<CountryRecord> {
    Ok(CountryRecord {
        name: row.try_get("name")?,
        capital: row.try_get("capital")?,
        region: row.try_get("region")?,
        population: row.try_get::<i64, _>("population")?.max(0) as u64,
        currency_code: row.try_get("currency_code")?,
        exchange_rate: row.try_get("exchange_rate")?,
        estimated_gdp: row.try_get("estimated_gdp")?,
        flag_url: row.try_get("flag_url")?,
        last_refreshed_at: row.try_get("last_refreshed_at")?,
    })
}

const UPSERT_SQL: &str = r#"
    insert into countries (
      name, capital, region, population, currency_code,
      exchange_rate, estimated_gdp, flag_url, last_refreshed_at
    ) values (
      $1, $2, $3, $4, $5, $6, $7, $8, $9
    )
    on conflict (name) do update set
      capital = excluded.capital,
      region = excluded.region,
      population = excluded.population,
      currency_code = excluded.currency_code,
      exchange_rate = excluded.exchange_rate,
      estimated_gdp = excluded.estimated_gdp,
      flag_url = excluded.flag_url,
      last_refreshed_at = excluded.last_refreshed_at
"#;

const UPDATE_SQL: &str = r#"
    update countries set
      capital = $2,
      region = $3,
      population = $4,
      currency_code = $5,
      exchange_rate = $6,
      estimated_gdp = $7,
      flag_url = $8,
      last_refreshed_at = $9
    where name = $1
"#;

#[async_trait]
impl CountryStore for PgCountryStore {
    async fn get_all(&self, filter: &ListFilter) -> Result<Vec<CountryRecord>> {
        let mut sql = format!("select {SELECT_COLUMNS} from countries");
        let mut conds: Vec<String> = Vec::new();
        let mut args: Vec<&str> = Vec::new();

        if let Some(region) = filter.region.as_deref() {
            conds.push(format!("region = ${}", args.len() + 1));
            args.push(region);
        }
        if let Some(currency) = filter.currency.as_deref() {
            conds.push(format!("currency_code = ${}", args.len() + 1));
            args.push(currency);
        }
        if !conds.is_empty() {
            sql.push_str(" where ");
            sql.push_str(&conds.join(" and "));
        }

        match filter.sort {
            Some(SortOrder::GdpDesc) => sql.push_str(" order by estimated_gdp desc nulls last"),
            None => sql.push_str(" order by id asc"),
        }

        let mut query = sqlx::query(&sql);
        for arg in args {
            query = query.bind(arg);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("get_all query failed")?;

        rows.iter().map(row_to_record).collect()
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<CountryRecord>> {
        let sql = format!("select {SELECT_COLUMNS} from countries where name = $1");
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("get_by_name query failed")?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn apply_refresh(
        &self,
        to_insert: &[CountryRecord],
        to_update: &[CountryRecord],
    ) -> Result<()> {
        if to_insert.is_empty() && to_update.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .context("apply_refresh begin failed")?;

        for rec in to_insert {
            sqlx::query(UPSERT_SQL)
                .bind(&rec.name)
                .bind(&rec.capital)
                .bind(&rec.region)
                .bind(rec.population as i64)
                .bind(&rec.currency_code)
                .bind(rec.exchange_rate)
                .bind(rec.estimated_gdp)
                .bind(&rec.flag_url)
                .bind(rec.last_refreshed_at)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("insert failed for {}", rec.name))?;
        }

        for rec in to_update {
            sqlx::query(UPDATE_SQL)
                .bind(&rec.name)
                .bind(&rec.capital)
                .bind(&rec.region)
                .bind(rec.population as i64)
                .bind(&rec.currency_code)
                .bind(rec.exchange_rate)
                .bind(rec.estimated_gdp)
                .bind(&rec.flag_url)
                .bind(rec.last_refreshed_at)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("update failed for {}", rec.name))?;
        }

        tx.commit().await.context("apply_refresh commit failed")?;
        Ok(())
    }

    async fn delete_by_name(&self, name: &str) -> Result<bool> {
        let res = sqlx::query("delete from countries where name = $1")
            .bind(name)
            .execute(&self.pool)
            .await
            .context("delete_by_name failed")?;
        Ok(res.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        let (n,): (i64,) =
            sqlx::query_as::<_, (i64,)>("select count(*)::bigint from countries")
                .fetch_one(&self.pool)
                .await
                .context("count query failed")?;
        Ok(n)
    }
}
