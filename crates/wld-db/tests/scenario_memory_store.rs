//! Scenario coverage for the testkit memory store. The Postgres store is
//! exercised against a live database in deployment environments; these
//! tests pin the contract both implementations share.

use chrono::{TimeZone, Utc};
use wld_db::{CountryStore, ListFilter, MemoryCountryStore, SortOrder};
use wld_schemas::CountryRecord;

fn record(name: &str, region: &str, code: Option<&str>, gdp: Option<f64>) -> CountryRecord {
    CountryRecord {
        name: name.to_string(),
        capital: String::new(),
        region: region.to_string(),
        population: 1_000,
        currency_code: code.map(str::to_string),
        exchange_rate: gdp.map(|_| 1.0),
        estimated_gdp: gdp,
        flag_url: String::new(),
        last_refreshed_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn apply_refresh_inserts_then_updates_in_place() {
    let store = MemoryCountryStore::new();

    store
        .apply_refresh(&[record("France", "Europe", Some("EUR"), Some(1.0))], &[])
        .await
        .unwrap();
    assert_eq!(store.count().await.unwrap(), 1);

    let mut updated = record("France", "Europe", Some("EUR"), Some(2.0));
    updated.population = 2_000;
    store.apply_refresh(&[], &[updated]).await.unwrap();

    assert_eq!(store.count().await.unwrap(), 1);
    let france = store.get_by_name("France").await.unwrap().unwrap();
    assert_eq!(france.population, 2_000);
    assert_eq!(france.estimated_gdp, Some(2.0));
}

#[tokio::test]
async fn insert_of_existing_name_upserts_instead_of_duplicating() {
    let store = MemoryCountryStore::new();
    store
        .apply_refresh(&[record("France", "Europe", Some("EUR"), Some(1.0))], &[])
        .await
        .unwrap();

    // A racing refresh that classified France as new again.
    store
        .apply_refresh(&[record("France", "Europe", Some("EUR"), Some(3.0))], &[])
        .await
        .unwrap();

    assert_eq!(store.count().await.unwrap(), 1);
    let france = store.get_by_name("France").await.unwrap().unwrap();
    assert_eq!(france.estimated_gdp, Some(3.0));
}

#[tokio::test]
async fn get_all_preserves_insertion_order() {
    let store = MemoryCountryStore::new();
    store
        .apply_refresh(
            &[
                record("B", "Europe", None, None),
                record("A", "Asia", None, None),
                record("C", "Africa", None, None),
            ],
            &[],
        )
        .await
        .unwrap();

    let all = store.get_all(&ListFilter::default()).await.unwrap();
    let names: Vec<_> = all.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["B", "A", "C"]);
}

#[tokio::test]
async fn filters_and_gdp_sort_apply() {
    let store = MemoryCountryStore::new();
    store
        .apply_refresh(
            &[
                record("France", "Europe", Some("EUR"), Some(2.0)),
                record("Germany", "Europe", Some("EUR"), Some(5.0)),
                record("Japan", "Asia", Some("JPY"), Some(9.0)),
                record("Nauru", "Oceania", None, None),
            ],
            &[],
        )
        .await
        .unwrap();

    let europe = store
        .get_all(&ListFilter {
            region: Some("Europe".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(europe.len(), 2);

    let by_gdp = store
        .get_all(&ListFilter {
            sort: Some(SortOrder::GdpDesc),
            ..Default::default()
        })
        .await
        .unwrap();
    let names: Vec<_> = by_gdp.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Japan", "Germany", "France", "Nauru"]);
}

#[tokio::test]
async fn delete_reports_whether_a_row_matched() {
    let store = MemoryCountryStore::new();
    store
        .apply_refresh(&[record("France", "Europe", None, None)], &[])
        .await
        .unwrap();

    assert!(store.delete_by_name("France").await.unwrap());
    assert!(!store.delete_by_name("France").await.unwrap());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn get_by_name_distinguishes_not_found() {
    let store = MemoryCountryStore::new();
    assert!(store.get_by_name("Nowhere").await.unwrap().is_none());
}
