//! KPI analytics for Ad-Visor.
//!
//! Loads KPI datasets from JSON fixtures and merges a current and a previous
//! dataset into one table for comparison charts.

pub mod error;
pub mod loader;
pub mod merge;

pub use error::{AnalyticsError, AnalyticsResult};
pub use loader::{load, parse};
pub use merge::merge;
