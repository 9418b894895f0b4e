//! Summary projection over the full persisted dataset.

use chrono::Utc;
use wld_schemas::{CountryRecord, CountrySummary, GdpEntry};

/// How many countries the top-by-GDP list may contain.
pub const TOP_N: usize = 5;

/// Project the dataset into the aggregate view the renderer consumes.
///
/// Records without an estimated GDP are excluded from the top list but still
/// count toward the total. The sort is stable, so equal GDP values keep
/// their dataset order.
///
/// `last_refreshed_at` is taken from the first record in dataset order (the
/// original service did the same; it is not necessarily the newest stamp).
/// An empty dataset falls back to the current time.
pub fn project(records: &[CountryRecord]) -> CountrySummary {
    let mut ranked: Vec<GdpEntry> = records
        .iter()
        .filter_map(|r| {
            r.estimated_gdp.map(|gdp| GdpEntry {
                name: r.name.clone(),
                estimated_gdp: gdp,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.estimated_gdp
            .partial_cmp(&a.estimated_gdp)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(TOP_N);

    let last_refreshed_at = records
        .first()
        .map(|r| r.last_refreshed_at)
        .unwrap_or_else(Utc::now);

    CountrySummary {
        total_countries: records.len(),
        top_by_gdp: ranked,
        last_refreshed_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(name: &str, gdp: Option<f64>) -> CountryRecord {
        CountryRecord {
            name: name.to_string(),
            capital: String::new(),
            region: String::new(),
            population: 1,
            currency_code: gdp.map(|_| "USD".to_string()),
            exchange_rate: gdp.map(|_| 1.0),
            estimated_gdp: gdp,
            flag_url: String::new(),
            last_refreshed_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn top_list_caps_at_five_descending_with_stable_ties() {
        let records = vec![
            record("A", Some(5.0)),
            record("B", Some(1.0)),
            record("C", Some(9.0)),
            record("D", Some(3.0)),
            record("E", Some(9.0)),
            record("F", Some(2.0)),
            record("G", None),
        ];

        let summary = project(&records);
        assert_eq!(summary.total_countries, 7);

        let names: Vec<_> = summary.top_by_gdp.iter().map(|e| e.name.as_str()).collect();
        // Both 9s survive, first occurrence first.
        assert_eq!(names, ["C", "E", "A", "D", "F"]);

        let values: Vec<_> = summary
            .top_by_gdp
            .iter()
            .map(|e| e.estimated_gdp)
            .collect();
        assert!(values.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn fewer_than_five_qualifying_is_not_an_error() {
        let records = vec![record("A", Some(2.0)), record("B", None)];
        let summary = project(&records);
        assert_eq!(summary.total_countries, 2);
        assert_eq!(summary.top_by_gdp.len(), 1);
    }

    #[test]
    fn no_qualifying_records_yields_empty_top_list() {
        let records = vec![record("A", None), record("B", None)];
        let summary = project(&records);
        assert_eq!(summary.total_countries, 2);
        assert!(summary.top_by_gdp.is_empty());
    }

    #[test]
    fn timestamp_comes_from_first_record_in_dataset_order() {
        let mut first = record("A", None);
        first.last_refreshed_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut newer = record("B", None);
        newer.last_refreshed_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let summary = project(&[first.clone(), newer]);
        assert_eq!(summary.last_refreshed_at, first.last_refreshed_at);
    }

    #[test]
    fn empty_dataset_falls_back_to_now() {
        let before = Utc::now();
        let summary = project(&[]);
        let after = Utc::now();
        assert_eq!(summary.total_countries, 0);
        assert!(summary.top_by_gdp.is_empty());
        assert!(summary.last_refreshed_at >= before && summary.last_refreshed_at <= after);
    }
}
