//! Data module - dataset loading, typed records and filtering

mod categories;
mod filter;
mod loader;
mod records;

pub use categories::{CategoryMap, OVERALL_LABEL};
pub use filter::{
    division_rows, heatmap_rows, latest_snapshot, resolve_division, trend_rows,
    InflationObservation, LatestSnapshot,
};
pub use loader::{load, DatasetCache};
pub use records::{CpiRecord, Dataset};
