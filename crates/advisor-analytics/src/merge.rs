//! Merging of current and previous KPI series.

use advisor_models::{CombinedRow, CombinedTable, KpiSeries, KpiVersion};

/// Tag both series and union them into one table.
///
/// Current rows come first; each series keeps its own date order. Without a
/// previous series the table holds only the current rows.
pub fn merge(current: &KpiSeries, previous: Option<&KpiSeries>) -> CombinedTable {
    let tagged = |series: &KpiSeries, version: KpiVersion| {
        series
            .records()
            .iter()
            .cloned()
            .map(move |record| CombinedRow { version, record })
            .collect::<Vec<_>>()
    };

    let mut rows = tagged(current, KpiVersion::Current);
    if let Some(previous) = previous {
        rows.extend(tagged(previous, KpiVersion::Old));
    }

    CombinedTable::new(rows)
}
