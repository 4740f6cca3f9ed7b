//! Shared data models for the Ad-Visor review engine.
//!
//! This crate provides Serde-serializable types for:
//! - Remote assets and their lifecycle state
//! - AI analysis results
//! - KPI records, series and the combined comparison table

pub mod analysis;
pub mod asset;
pub mod kpi;

// Re-export common types
pub use analysis::{AnalysisResult, SummaryPair};
pub use asset::{AssetState, RemoteAsset};
pub use kpi::{
    CombinedRow, CombinedTable, Kpi, KpiPoint, KpiRecord, KpiSeries, KpiValues, KpiVersion,
};
