//! Load-then-merge behaviour against fixture files on disk.

use std::io::Write;

use advisor_analytics::{load, merge, AnalyticsError};
use advisor_models::{Kpi, KpiVersion};
use tempfile::NamedTempFile;

const CURRENT: &str = r#"{
  "data": [
    {"date": "2024-05-01", "ROAS": 3.1, "CPA": 11.0, "CTR": 1.9, "CVR": 2.4, "CPL": 4.0, "CPC": 0.42},
    {"date": "2024-05-02", "ROAS": 3.4, "CPA": 10.2, "CTR": 2.1, "CVR": 2.6, "CPL": 3.8, "CPC": 0.40},
    {"date": "2024-05-03", "ROAS": 3.0, "CPA": 11.5, "CTR": 1.8}
  ]
}"#;

const PREVIOUS: &str = r#"{
  "data": [
    {"date": "2024-04-01", "ROAS": 2.2, "CPA": 14.0},
    {"date": "2024-04-02", "ROAS": 2.0, "CPA": 15.1}
  ]
}"#;

fn fixture(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write fixture");
    file
}

#[tokio::test]
async fn test_merge_without_previous_tags_everything_current() {
    let current_file = fixture(CURRENT);
    let current = load(current_file.path()).await.unwrap();

    let table = merge(&current, None);

    assert_eq!(table.len(), 3);
    assert!(table
        .rows()
        .iter()
        .all(|row| row.version == KpiVersion::Current));
}

#[tokio::test]
async fn test_merge_preserves_values_and_dates() {
    let current_file = fixture(CURRENT);
    let previous_file = fixture(PREVIOUS);
    let current = load(current_file.path()).await.unwrap();
    let previous = load(previous_file.path()).await.unwrap();

    let table = merge(&current, Some(&previous));

    assert_eq!(table.len(), current.len() + previous.len());

    let current_rows: Vec<_> = table
        .rows()
        .iter()
        .filter(|r| r.version == KpiVersion::Current)
        .map(|r| &r.record)
        .collect();
    let old_rows: Vec<_> = table
        .rows()
        .iter()
        .filter(|r| r.version == KpiVersion::Old)
        .map(|r| &r.record)
        .collect();

    assert_eq!(current_rows, current.records().iter().collect::<Vec<_>>());
    assert_eq!(old_rows, previous.records().iter().collect::<Vec<_>>());
}

#[tokio::test]
async fn test_chart_columns_follow_available_data() {
    let previous_file = fixture(PREVIOUS);
    let previous = load(previous_file.path()).await.unwrap();

    let table = merge(&previous, None);

    assert_eq!(table.available_kpis(), vec![Kpi::Roas, Kpi::Cpa]);
    let roas = table.column(Kpi::Roas);
    assert_eq!(roas.len(), 2);
    assert_eq!(roas[0].value, 2.2);
    assert_eq!(roas[0].date.to_string(), "2024-04-01");
}

#[tokio::test]
async fn test_load_missing_file_is_io_error() {
    let err = load("/nonexistent/analytics1.json").await.unwrap_err();
    assert!(matches!(err, AnalyticsError::Io { .. }));
}
