//! Aggregator Module
//! Grouped means over filtered record subsets: the cross-state average
//! series and the category-by-year inflation table.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::data::{CpiRecord, InflationObservation};

/// Mean index per date across every state present, ascending by date.
///
/// One point per distinct input date; a date with no observation for any
/// state is simply absent, never interpolated. Empty input gives an empty
/// series.
pub fn average_series(rows: &[CpiRecord]) -> Vec<(NaiveDate, f64)> {
    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = by_date.entry(row.date).or_insert((0.0, 0));
        entry.0 += row.index;
        entry.1 += 1;
    }
    by_date
        .into_iter()
        .map(|(date, (sum, count))| (date, sum / count as f64))
        .collect()
}

/// Category-by-year table of mean year-over-year inflation.
///
/// A `(category, year)` pair with zero observations has no cell at all;
/// `cell` returns `None` for it. `Some(0.0)` is a real measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct InflationTable {
    categories: Vec<String>,
    years: Vec<i32>,
    cells: HashMap<(String, i32), f64>,
}

impl InflationTable {
    /// Row labels, sorted.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Column labels, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn cell(&self, category: &str, year: i32) -> Option<f64> {
        self.cells.get(&(category.to_string(), year)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Smallest and largest cell values, for scaling a diverging color map.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let mut values = self.cells.values();
        let first = *values.next()?;
        let (min, max) = values.fold((first, first), |(min, max), &v| {
            (min.min(v), max.max(v))
        });
        Some((min, max))
    }
}

pub fn annual_inflation_table(observations: &[InflationObservation]) -> InflationTable {
    let mut sums: HashMap<(String, i32), (f64, usize)> = HashMap::new();
    let mut categories: BTreeSet<String> = BTreeSet::new();
    let mut years: BTreeSet<i32> = BTreeSet::new();

    for obs in observations {
        categories.insert(obs.category.clone());
        years.insert(obs.year);
        let entry = sums
            .entry((obs.category.clone(), obs.year))
            .or_insert((0.0, 0));
        entry.0 += obs.inflation_yoy;
        entry.1 += 1;
    }

    let cells = sums
        .into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect();

    InflationTable {
        categories: categories.into_iter().collect(),
        years: years.into_iter().collect(),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{division_rows, trend_rows, CategoryMap};

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn cpi(date: NaiveDate, state: &str, division: &str, index: f64) -> CpiRecord {
        let map = CategoryMap::new();
        CpiRecord {
            date,
            state: state.to_string(),
            division: division.to_string(),
            category: map.label_or_code(division),
            index,
        }
    }

    fn obs(category: &str, year: i32, yoy: f64) -> InflationObservation {
        InflationObservation {
            category: category.to_string(),
            year,
            inflation_yoy: yoy,
        }
    }

    #[test]
    fn average_series_means_each_date() {
        let rows = vec![
            cpi(month(2023, 1), "A", "01", 101.2),
            cpi(month(2023, 1), "B", "01", 99.8),
            cpi(month(2023, 1), "C", "01", 100.0),
        ];
        let series = average_series(&rows);
        assert_eq!(series.len(), 1);
        assert!((series[0].1 - 100.333_333).abs() < 1e-6);
    }

    #[test]
    fn average_series_is_date_ascending_with_no_interpolation() {
        let rows = vec![
            cpi(month(2023, 3), "A", "01", 103.0),
            cpi(month(2023, 1), "A", "01", 101.0),
            cpi(month(2023, 1), "B", "01", 103.0),
        ];
        let series = average_series(&rows);
        let dates: Vec<NaiveDate> = series.iter().map(|(d, _)| *d).collect();
        assert_eq!(dates, [month(2023, 1), month(2023, 3)]);
        assert_eq!(series[0].1, 102.0);
        assert_eq!(series[1].1, 103.0);
        // Never more points than distinct input dates.
        assert!(series.len() <= 2);
    }

    #[test]
    fn average_series_of_nothing_is_empty() {
        assert!(average_series(&[]).is_empty());
    }

    #[test]
    fn trend_and_average_end_to_end() {
        let records = vec![
            cpi(month(2023, 1), "A", "01", 99.0),
            cpi(month(2023, 2), "A", "01", 101.0),
            cpi(month(2023, 1), "B", "01", 101.0),
            cpi(month(2023, 2), "B", "01", 103.0),
        ];
        let states = vec!["A".to_string(), "B".to_string()];
        let from = month(2023, 1);
        let to = month(2023, 2);

        let trend = trend_rows(&records, &states, "01", from, to);
        let dates: BTreeSet<NaiveDate> = trend.iter().map(|r| r.date).collect();
        assert_eq!(dates.len(), 2);

        let average = average_series(&division_rows(&records, "01", from, to));
        assert_eq!(average, [(month(2023, 1), 100.0), (month(2023, 2), 102.0)]);
    }

    #[test]
    fn average_exists_even_with_empty_state_selection() {
        let records = vec![
            cpi(month(2023, 1), "A", "01", 99.0),
            cpi(month(2023, 1), "B", "01", 101.0),
        ];
        let trend = trend_rows(&records, &[], "01", month(2023, 1), month(2023, 1));
        assert!(trend.is_empty());

        let average = average_series(&division_rows(&records, "01", month(2023, 1), month(2023, 1)));
        assert_eq!(average, [(month(2023, 1), 100.0)]);
    }

    #[test]
    fn inflation_table_means_per_category_year() {
        let table = annual_inflation_table(&[
            obs("Transport", 2022, 2.0),
            obs("Transport", 2022, 4.0),
            obs("Transport", 2023, 1.5),
            obs("Health", 2023, -0.5),
        ]);

        assert_eq!(table.categories(), ["Health", "Transport"]);
        assert_eq!(table.years(), [2022, 2023]);
        assert_eq!(table.cell("Transport", 2022), Some(3.0));
        assert_eq!(table.cell("Transport", 2023), Some(1.5));
        assert_eq!(table.cell("Health", 2023), Some(-0.5));
        assert_eq!(table.value_bounds(), Some((-0.5, 3.0)));
    }

    #[test]
    fn missing_cell_is_absent_not_zero() {
        let table = annual_inflation_table(&[
            obs("Transport", 2022, 2.0),
            obs("Health", 2023, 1.0),
            // A genuine zero measurement is a present cell.
            obs("Education", 2022, 0.0),
        ]);

        assert_eq!(table.cell("Health", 2022), None);
        assert_eq!(table.cell("Transport", 2023), None);
        assert_eq!(table.cell("Education", 2022), Some(0.0));
    }

    #[test]
    fn empty_table_has_no_bounds() {
        let table = annual_inflation_table(&[]);
        assert!(table.is_empty());
        assert_eq!(table.value_bounds(), None);
        assert!(table.categories().is_empty());
        assert!(table.years().is_empty());
    }
}
