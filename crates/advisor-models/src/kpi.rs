//! KPI analytics models.
//!
//! A [`KpiSeries`] is one dataset of dated observations. Two series are
//! tagged with a [`KpiVersion`] and unioned into a [`CombinedTable`] for
//! charting.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Performance indicators tracked per observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Kpi {
    Roas,
    Cpa,
    Ctr,
    Cvr,
    Cpl,
    Cpc,
}

impl Kpi {
    /// All KPIs in canonical column order.
    pub const ALL: [Kpi; 6] = [Kpi::Roas, Kpi::Cpa, Kpi::Ctr, Kpi::Cvr, Kpi::Cpl, Kpi::Cpc];

    /// Field name used in analytics documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kpi::Roas => "ROAS",
            Kpi::Cpa => "CPA",
            Kpi::Ctr => "CTR",
            Kpi::Cvr => "CVR",
            Kpi::Cpl => "CPL",
            Kpi::Cpc => "CPC",
        }
    }

    /// Look up a KPI by its document field name.
    pub fn from_field(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kpi| kpi.as_str() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Kpi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which dataset a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum KpiVersion {
    Current,
    Old,
}

impl KpiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            KpiVersion::Current => "Current",
            KpiVersion::Old => "Old",
        }
    }
}

impl std::fmt::Display for KpiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// KPI values of one observation. Any KPI may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KpiValues([Option<f64>; 6]);

impl KpiValues {
    pub fn get(&self, kpi: Kpi) -> Option<f64> {
        self.0[kpi.index()]
    }

    pub fn set(&mut self, kpi: Kpi, value: Option<f64>) {
        self.0[kpi.index()] = value;
    }

    /// Builder-style setter.
    pub fn with(mut self, kpi: Kpi, value: f64) -> Self {
        self.set(kpi, Some(value));
        self
    }

    /// Present values in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Kpi, f64)> + '_ {
        Kpi::ALL
            .into_iter()
            .filter_map(move |kpi| self.get(kpi).map(|v| (kpi, v)))
    }
}

/// One dated observation.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiRecord {
    /// Observation date
    pub date: NaiveDate,

    /// Named KPI values
    pub values: KpiValues,

    /// Non-KPI fields of the source record, kept for the prompt hand-off
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl KpiRecord {
    pub fn new(date: NaiveDate, values: KpiValues) -> Self {
        Self {
            date,
            values,
            extra: BTreeMap::new(),
        }
    }
}

/// Serialized as a flat object: `date`, KPIs in canonical order, then extra
/// fields sorted by name. The order is stable across runs.
impl Serialize for KpiRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("date", &self.date)?;
        for (kpi, value) in self.values.iter() {
            map.serialize_entry(kpi.as_str(), &value)?;
        }
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A dataset of observations ordered by date.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KpiSeries {
    #[serde(rename = "data")]
    records: Vec<KpiRecord>,
}

impl KpiSeries {
    /// Create a series, stable-sorting records by date.
    pub fn new(mut records: Vec<KpiRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    pub fn records(&self) -> &[KpiRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render the series as pretty JSON for embedding in a prompt.
    pub fn to_prompt_text(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A record tagged with the dataset it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRow {
    pub version: KpiVersion,
    #[serde(flatten)]
    pub record: KpiRecord,
}

/// One chartable point, keyed by (date, KPI, version).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KpiPoint {
    pub date: NaiveDate,
    pub kpi: Kpi,
    pub version: KpiVersion,
    pub value: f64,
}

/// Union of tagged KPI rows for joint rendering.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CombinedTable {
    rows: Vec<CombinedRow>,
}

impl CombinedTable {
    pub fn new(rows: Vec<CombinedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CombinedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// KPIs with at least one value, in canonical order.
    ///
    /// Columns missing from every row have no chart series.
    pub fn available_kpis(&self) -> Vec<Kpi> {
        Kpi::ALL
            .into_iter()
            .filter(|kpi| self.rows.iter().any(|r| r.record.values.get(*kpi).is_some()))
            .collect()
    }

    /// Points of a single KPI column, skipping rows without a value.
    pub fn column(&self, kpi: Kpi) -> Vec<KpiPoint> {
        self.rows
            .iter()
            .filter_map(|row| {
                row.record.values.get(kpi).map(|value| KpiPoint {
                    date: row.record.date,
                    kpi,
                    version: row.version,
                    value,
                })
            })
            .collect()
    }

    /// Long-form view of every present value.
    pub fn points(&self) -> Vec<KpiPoint> {
        self.available_kpis()
            .into_iter()
            .flat_map(|kpi| self.column(kpi))
            .collect()
    }
}
