//! Stats module - grouped aggregation over filtered records

mod aggregator;

pub use aggregator::{annual_inflation_table, average_series, InflationTable};
