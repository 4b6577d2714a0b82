//! Data Loader Module
//! Fetches the OpenDOSM CPI parquet datasets, converts them to typed records
//! and memoizes the result in a single-slot TTL cache.

use polars::prelude::*;
use std::collections::BTreeSet;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::categories::CategoryMap;
use crate::data::records::{CpiRecord, Dataset, InflationRecord};

/// Monthly CPI index values per state and division.
pub const CPI_URL: &str = "https://storage.dosm.gov.my/cpi/cpi_2d_state.parquet";

/// Year-over-year inflation per state and division.
pub const INFLATION_URL: &str = "https://storage.dosm.gov.my/cpi/cpi_2d_state_inflation.parquet";

/// How long a loaded dataset is served before the next load re-fetches.
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("failed to fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to decode dataset")]
    Decode(#[from] PolarsError),
}

/// Fetch and convert both datasets.
///
/// The two downloads run concurrently; either failure is fatal for the whole
/// load and no partial dataset is produced.
pub fn load() -> Result<Dataset, LoaderError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(LoaderError::Client)?;

    let (cpi_df, inflation_df) = rayon::join(
        || fetch_dataframe(&client, CPI_URL),
        || fetch_dataframe(&client, INFLATION_URL),
    );
    let (cpi_df, inflation_df) = (cpi_df?, inflation_df?);

    let categories = CategoryMap::new();
    let cpi = cpi_records(&cpi_df, &categories)?;
    let inflation = inflation_records(&inflation_df, &categories)?;

    info!(
        cpi_rows = cpi.len(),
        inflation_rows = inflation.len(),
        "loaded CPI datasets"
    );

    Ok(Dataset::new(cpi, inflation, categories))
}

fn fetch_dataframe(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<DataFrame, LoaderError> {
    debug!(%url, "fetching dataset");

    let fetch_err = |source| LoaderError::Fetch {
        url: url.to_string(),
        source,
    };
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(fetch_err)?;
    let payload = response.bytes().map_err(fetch_err)?;

    let df = ParquetReader::new(Cursor::new(payload)).finish()?;
    Ok(df)
}

/// Convert the CPI frame to records, joining category labels.
///
/// Rows with a missing date, state, division or index value are dropped.
fn cpi_records(df: &DataFrame, map: &CategoryMap) -> Result<Vec<CpiRecord>, LoaderError> {
    let dates = date_column(df, "date")?;
    let states = str_column(df, "state")?;
    let divisions = str_column(df, "division")?;
    let indices = f64_column(df, "index")?;

    let mut records = Vec::with_capacity(df.height());
    let mut skipped = 0usize;
    let mut unknown: BTreeSet<String> = BTreeSet::new();

    for (((date, state), division), index) in
        dates.into_iter().zip(states).zip(divisions).zip(indices)
    {
        match (date, state, division, index) {
            (Some(date), Some(state), Some(division), Some(index)) if index.is_finite() => {
                if map.label_for(&division).is_none() {
                    unknown.insert(division.clone());
                }
                let category = map.label_or_code(&division);
                records.push(CpiRecord {
                    date,
                    state,
                    division,
                    category,
                    index,
                });
            }
            _ => skipped += 1,
        }
    }

    report_row_quality(skipped, &unknown);
    Ok(records)
}

/// Convert the inflation frame to records.
///
/// A missing `inflation_yoy` is a valid observation (`None`); only rows with
/// a missing key field are dropped.
fn inflation_records(
    df: &DataFrame,
    map: &CategoryMap,
) -> Result<Vec<InflationRecord>, LoaderError> {
    let dates = date_column(df, "date")?;
    let states = str_column(df, "state")?;
    let divisions = str_column(df, "division")?;
    let values = f64_column(df, "inflation_yoy")?;

    let mut records = Vec::with_capacity(df.height());
    let mut skipped = 0usize;
    let mut unknown: BTreeSet<String> = BTreeSet::new();

    for (((date, state), division), inflation_yoy) in
        dates.into_iter().zip(states).zip(divisions).zip(values)
    {
        match (date, state, division) {
            (Some(date), Some(state), Some(division)) => {
                if map.label_for(&division).is_none() {
                    unknown.insert(division.clone());
                }
                let category = map.label_or_code(&division);
                records.push(InflationRecord {
                    date,
                    state,
                    division,
                    category,
                    inflation_yoy: inflation_yoy.filter(|v| v.is_finite()),
                });
            }
            _ => skipped += 1,
        }
    }

    report_row_quality(skipped, &unknown);
    Ok(records)
}

fn report_row_quality(skipped: usize, unknown: &BTreeSet<String>) {
    if skipped > 0 {
        warn!(rows = skipped, "dropped rows with missing key fields");
    }
    for code in unknown {
        warn!(%code, "division code missing from category map, using raw code as label");
    }
}

/// Read a column as dates, accepting date-, datetime- or string-typed input.
fn date_column(df: &DataFrame, name: &str) -> Result<Vec<Option<chrono::NaiveDate>>, LoaderError> {
    let days = df
        .column(name)?
        .cast(&DataType::Date)?
        .cast(&DataType::Int32)?;
    let days = days.i32()?;
    Ok(days
        .into_iter()
        .map(|d| d.and_then(date_from_epoch_days))
        .collect())
}

fn str_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoaderError> {
    let col = df.column(name)?.cast(&DataType::String)?;
    let ca = col.str()?;
    Ok(ca.into_iter().map(|v| v.map(|s| s.to_string())).collect())
}

fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, LoaderError> {
    let col = df.column(name)?.cast(&DataType::Float64)?;
    let ca = col.f64()?;
    Ok(ca.into_iter().collect())
}

fn date_from_epoch_days(days: i32) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::from_num_days_from_ce_opt(days + EPOCH_DAYS_FROM_CE)
}

struct CacheSlot {
    dataset: Arc<Dataset>,
    fetched_at: Instant,
}

/// Single-slot dataset cache with a time-to-live.
///
/// There is no ambient global: the application owns one instance and every
/// load goes through `get_or_load`.
pub struct DatasetCache {
    ttl: Duration,
    slot: Mutex<Option<CacheSlot>>,
}

impl DatasetCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(CACHE_TTL)
    }

    /// Return the cached dataset while it is fresh, otherwise run `fetch`
    /// and store its result.
    ///
    /// The lock is held across the fetch, so concurrent callers inside the
    /// window share a single download. A failed fetch leaves the slot
    /// unchanged and the next call retries.
    pub fn get_or_load<F>(&self, fetch: F) -> Result<Arc<Dataset>, LoaderError>
    where
        F: FnOnce() -> Result<Dataset, LoaderError>,
    {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(cached) = slot.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                debug!("serving cached dataset");
                return Ok(Arc::clone(&cached.dataset));
            }
        }

        let dataset = Arc::new(fetch()?);
        *slot = Some(CacheSlot {
            dataset: Arc::clone(&dataset),
            fetched_at: Instant::now(),
        });
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn tiny_dataset() -> Dataset {
        Dataset::new(Vec::new(), Vec::new(), CategoryMap::new())
    }

    #[test]
    fn epoch_day_conversion() {
        assert_eq!(date_from_epoch_days(0), Some(month(1970, 1)));
        assert_eq!(date_from_epoch_days(19_358), Some(month(2023, 1)));
    }

    #[test]
    fn cache_serves_cached_value_within_ttl() {
        let cache = DatasetCache::new(Duration::from_secs(3600));
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_load(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(tiny_dataset())
            })
            .unwrap();
        let second = cache
            .get_or_load(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(tiny_dataset())
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn cache_refetches_after_expiry() {
        let cache = DatasetCache::new(Duration::from_millis(5));
        let calls = AtomicUsize::new(0);

        cache
            .get_or_load(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(tiny_dataset())
            })
            .unwrap();
        std::thread::sleep(Duration::from_millis(10));
        cache
            .get_or_load(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(tiny_dataset())
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_fetch_leaves_slot_retryable() {
        let cache = DatasetCache::new(Duration::from_secs(3600));

        let err = cache.get_or_load(|| {
            Err(LoaderError::Decode(PolarsError::NoData(
                "empty payload".into(),
            )))
        });
        assert!(err.is_err());

        let calls = AtomicUsize::new(0);
        cache
            .get_or_load(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(tiny_dataset())
            })
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn converts_string_dates_and_joins_categories() {
        let df = DataFrame::new(vec![
            Column::new(
                "date".into(),
                vec!["2023-01-01".to_string(), "2023-02-01".to_string()],
            ),
            Column::new(
                "state".into(),
                vec!["Selangor".to_string(), "Selangor".to_string()],
            ),
            Column::new("division".into(), vec!["01".to_string(), "99".to_string()]),
            Column::new("index".into(), vec![100.0, 101.5]),
        ])
        .unwrap();

        let records = cpi_records(&df, &CategoryMap::new()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, month(2023, 1));
        assert_eq!(records[0].category, "Food & Beverages");
        // Unknown division keeps its raw code as label.
        assert_eq!(records[1].category, "99");
        assert_eq!(records[1].index, 101.5);
    }

    #[test]
    fn missing_inflation_value_is_kept_as_none() {
        let df = DataFrame::new(vec![
            Column::new(
                "date".into(),
                vec!["2023-01-01".to_string(), "2023-02-01".to_string()],
            ),
            Column::new(
                "state".into(),
                vec!["Johor".to_string(), "Johor".to_string()],
            ),
            Column::new("division".into(), vec!["02".to_string(), "02".to_string()]),
            Column::new("inflation_yoy".into(), vec![Some(1.25), None]),
        ])
        .unwrap();

        let records = inflation_records(&df, &CategoryMap::new()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].inflation_yoy, Some(1.25));
        assert_eq!(records[1].inflation_yoy, None);
    }
}
