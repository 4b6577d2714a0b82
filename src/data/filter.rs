//! Filter Engine Module
//! Derives the chart row subsets from the loaded dataset. Every function
//! takes immutable slices and returns new owned rows; the shared dataset is
//! never touched.

use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;

use crate::data::categories::{CategoryMap, OVERALL_CODE};
use crate::data::records::{CpiRecord, InflationRecord};

/// Resolve a category label to its division code.
///
/// Unrecognized labels resolve to the overall aggregate, so a stale selector
/// value degrades to the headline index instead of an empty chart.
pub fn resolve_division(map: &CategoryMap, label: &str) -> String {
    map.code_for(label).unwrap_or(OVERALL_CODE).to_string()
}

/// Rows for the trend chart: selected states, one division, inclusive date
/// range.
pub fn trend_rows(
    records: &[CpiRecord],
    states: &[String],
    division: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<CpiRecord> {
    records
        .iter()
        .filter(|r| {
            states.iter().any(|s| s == &r.state)
                && r.division == division
                && r.date >= from
                && r.date <= to
        })
        .cloned()
        .collect()
}

/// Rows for the all-state average: same division and date bounds as the
/// trend, but across every state regardless of the user's selection.
pub fn division_rows(
    records: &[CpiRecord],
    division: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<CpiRecord> {
    records
        .iter()
        .filter(|r| r.division == division && r.date >= from && r.date <= to)
        .cloned()
        .collect()
}

/// Latest non-overall observations for one state.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestSnapshot {
    /// Maximum date present in the state's non-overall subset, `None` when
    /// the subset is empty.
    pub date: Option<NaiveDate>,
    /// Rows at that date, ascending by index value (stable for ties).
    pub rows: Vec<CpiRecord>,
}

impl LatestSnapshot {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Rows for the latest-period bar comparison: all named categories of one
/// state at the most recent date, overall excluded.
pub fn latest_snapshot(records: &[CpiRecord], state: &str) -> LatestSnapshot {
    let subset: Vec<&CpiRecord> = records
        .iter()
        .filter(|r| r.state == state && r.division != OVERALL_CODE)
        .collect();

    let date = subset.iter().map(|r| r.date).max();
    let mut rows: Vec<CpiRecord> = match date {
        Some(latest) => subset
            .into_iter()
            .filter(|r| r.date == latest)
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    rows.sort_by(|a, b| a.index.partial_cmp(&b.index).unwrap_or(Ordering::Equal));

    LatestSnapshot { date, rows }
}

/// One usable heatmap input row.
#[derive(Debug, Clone, PartialEq)]
pub struct InflationObservation {
    pub category: String,
    pub year: i32,
    pub inflation_yoy: f64,
}

/// Rows for the inflation heatmap: one state, overall excluded, rows without
/// a year-over-year value dropped, year derived from the date.
pub fn heatmap_rows(records: &[InflationRecord], state: &str) -> Vec<InflationObservation> {
    records
        .iter()
        .filter(|r| r.state == state && r.division != OVERALL_CODE)
        .filter_map(|r| {
            r.inflation_yoy.map(|inflation_yoy| InflationObservation {
                category: r.category.clone(),
                year: r.date.year(),
                inflation_yoy,
            })
        })
        .collect()
}
