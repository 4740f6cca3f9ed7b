//! Analytics document loading.
//!
//! Documents look like `{"data": [{"date": "2024-03-01", "ROAS": 2.1, ...}]}`.
//! Every record needs a date; KPI fields are optional numbers.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::debug;

use advisor_models::{Kpi, KpiRecord, KpiSeries, KpiValues};

use crate::error::{AnalyticsError, AnalyticsResult};

/// Load and parse an analytics document from disk.
pub async fn load(path: impl AsRef<Path>) -> AnalyticsResult<KpiSeries> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AnalyticsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let series = parse(&contents)?;
    debug!("Loaded {} KPI records from {}", series.len(), path.display());
    Ok(series)
}

/// Parse an analytics document.
pub fn parse(json: &str) -> AnalyticsResult<KpiSeries> {
    let document: Value = serde_json::from_str(json)
        .map_err(|e| AnalyticsError::format(format!("not valid JSON: {}", e)))?;

    let data = document
        .get("data")
        .ok_or_else(|| AnalyticsError::format("missing top-level \"data\" field"))?
        .as_array()
        .ok_or_else(|| AnalyticsError::format("\"data\" must be an array"))?;

    let records = data
        .iter()
        .enumerate()
        .map(|(index, value)| parse_record(index, value))
        .collect::<AnalyticsResult<Vec<_>>>()?;

    Ok(KpiSeries::new(records))
}

fn parse_record(index: usize, value: &Value) -> AnalyticsResult<KpiRecord> {
    let object = value
        .as_object()
        .ok_or_else(|| AnalyticsError::format(format!("record {}: not an object", index)))?;

    let date = match object.get("date") {
        Some(Value::String(s)) => parse_date(s).ok_or_else(|| {
            AnalyticsError::format(format!("record {}: unparseable date \"{}\"", index, s))
        })?,
        Some(_) => {
            return Err(AnalyticsError::format(format!(
                "record {}: \"date\" must be a string",
                index
            )))
        }
        None => {
            return Err(AnalyticsError::format(format!(
                "record {}: missing \"date\" field",
                index
            )))
        }
    };

    let mut values = KpiValues::default();
    for kpi in Kpi::ALL {
        values.set(kpi, parse_kpi(index, object, kpi)?);
    }

    let extra: BTreeMap<String, Value> = object
        .iter()
        .filter(|(key, _)| key.as_str() != "date" && Kpi::from_field(key).is_none())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(KpiRecord {
        date,
        values,
        extra,
    })
}

fn parse_kpi(index: usize, object: &Map<String, Value>, kpi: Kpi) -> AnalyticsResult<Option<f64>> {
    match object.get(kpi.as_str()) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(other) => Err(AnalyticsError::format(format!(
            "record {}: {} must be a number, got {}",
            index, kpi, other
        ))),
    }
}

/// Accepts plain dates, RFC 3339 timestamps and naive timestamps.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(s, "%Y/%m/%d").ok())
}
