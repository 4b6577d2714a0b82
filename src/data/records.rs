//! Record Types Module
//! Typed rows for both source datasets and the immutable loaded dataset.

use crate::data::categories::{CategoryMap, OVERALL_LABEL};
use chrono::NaiveDate;

/// One monthly CPI observation for a state and spending division.
#[derive(Debug, Clone, PartialEq)]
pub struct CpiRecord {
    /// Month-start date of the observation.
    pub date: NaiveDate,
    pub state: String,
    /// Division code ("01".."13") or "overall".
    pub division: String,
    /// Display label joined from the division code.
    pub category: String,
    /// Index value, base period = 100.
    pub index: f64,
}

/// One monthly year-over-year inflation observation.
#[derive(Debug, Clone, PartialEq)]
pub struct InflationRecord {
    pub date: NaiveDate,
    pub state: String,
    pub division: String,
    pub category: String,
    /// Signed percentage; `None` where the source has no value (first year
    /// of a series has no prior-year base).
    pub inflation_yoy: Option<f64>,
}

/// Both record sets plus the catalogs the controls are populated from.
///
/// Immutable once built; shared behind `Arc` and never mutated by any
/// filter or aggregation step.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub cpi: Vec<CpiRecord>,
    pub inflation: Vec<InflationRecord>,
    pub categories: CategoryMap,
    states: Vec<String>,
    category_labels: Vec<String>,
    months: Vec<NaiveDate>,
}

impl Dataset {
    pub fn new(
        cpi: Vec<CpiRecord>,
        inflation: Vec<InflationRecord>,
        categories: CategoryMap,
    ) -> Self {
        let mut states: Vec<String> = cpi.iter().map(|r| r.state.clone()).collect();
        states.sort();
        states.dedup();

        // "Overall" leads the list, remaining labels alphabetical.
        let mut category_labels: Vec<String> = cpi
            .iter()
            .map(|r| r.category.clone())
            .filter(|c| c != OVERALL_LABEL)
            .collect();
        category_labels.sort();
        category_labels.dedup();
        category_labels.insert(0, OVERALL_LABEL.to_string());

        let mut months: Vec<NaiveDate> = cpi.iter().map(|r| r.date).collect();
        months.sort();
        months.dedup();

        Self {
            cpi,
            inflation,
            categories,
            states,
            category_labels,
            months,
        }
    }

    /// Sorted unique state names present in the CPI set.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Category labels for the selector, "Overall" first.
    pub fn category_labels(&self) -> &[String] {
        &self.category_labels
    }

    /// Sorted unique observation months.
    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpi(date: NaiveDate, state: &str, division: &str, category: &str, index: f64) -> CpiRecord {
        CpiRecord {
            date,
            state: state.to_string(),
            division: division.to_string(),
            category: category.to_string(),
            index,
        }
    }

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn catalogs_are_sorted_and_deduplicated() {
        let rows = vec![
            cpi(month(2023, 2), "Selangor", "overall", "Overall", 101.0),
            cpi(month(2023, 1), "Johor", "01", "Food & Beverages", 99.0),
            cpi(month(2023, 1), "Selangor", "01", "Food & Beverages", 100.0),
        ];
        let ds = Dataset::new(rows, Vec::new(), CategoryMap::new());

        assert_eq!(ds.states(), ["Johor", "Selangor"]);
        assert_eq!(ds.category_labels(), ["Overall", "Food & Beverages"]);
        assert_eq!(ds.months(), [month(2023, 1), month(2023, 2)]);
    }

    #[test]
    fn empty_dataset_has_empty_catalogs() {
        let ds = Dataset::new(Vec::new(), Vec::new(), CategoryMap::new());
        assert!(ds.states().is_empty());
        assert!(ds.months().is_empty());
        assert_eq!(ds.category_labels(), ["Overall"]);
    }
}
