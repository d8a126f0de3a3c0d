use std::{
    future::Future,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags};
use serde::Deserialize;
use tracing::{debug, warn};

use super::entities::TimeRecordEntity;

/// Interface for abstracting the record store. The core only ever reads; which
/// database format sits behind this is the store's business.
pub trait RecordSource {
    /// Fetches records overlapping the optional `[start, end]` range, tags already
    /// extracted. A missing bound leaves that side of the range open.
    fn fetch_records(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<Vec<TimeRecordEntity>>> + Send;
}

impl<T: Deref> RecordSource for T
where
    T::Target: RecordSource,
{
    fn fetch_records(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<Vec<TimeRecordEntity>>> + Send {
        self.deref().fetch_records(start, end)
    }
}

/// Reads a timetagger user database. Each row of the `records` table carries the
/// start/end timestamps in `t1`/`t2` and a json blob in `_ob` with the record key
/// and description.
pub struct SqliteRecordSource {
    db_path: PathBuf,
}

impl SqliteRecordSource {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if !db_path.is_file() {
            return Err(anyhow!("record database not found: {}", db_path.display()));
        }
        Ok(Self { db_path })
    }
}

impl RecordSource for SqliteRecordSource {
    async fn fetch_records(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<TimeRecordEntity>> {
        let path = self.db_path.clone();
        // rusqlite is synchronous, keep it off the async workers
        tokio::task::spawn_blocking(move || fetch_blocking(&path, start, end)).await?
    }
}

/// The record's json payload. Unknown fields are timetagger internals we don't
/// need.
#[derive(Deserialize)]
struct RecordObject {
    #[serde(default)]
    key: String,
    #[serde(default)]
    ds: String,
}

fn fetch_blocking(
    path: &Path,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Vec<TimeRecordEntity>> {
    let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("failed to open record database {}", path.display()))?;

    let mut query = String::from("SELECT _ob, t1, t2 FROM records WHERE 1=1");
    let mut params = Vec::<f64>::new();
    if let Some(start) = start {
        query.push_str(" AND t1 >= ?");
        params.push(start.timestamp() as f64);
    }
    if let Some(end) = end {
        query.push_str(" AND t2 <= ?");
        params.push(end.timestamp() as f64);
    }
    query.push_str(" ORDER BY t1 DESC");

    let mut statement = connection.prepare(&query)?;
    let mut rows = statement.query(rusqlite::params_from_iter(params))?;

    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let blob: String = row.get(0)?;
        let t1: Option<f64> = row.get(1)?;
        let t2: Option<f64> = row.get(2)?;

        let object = match serde_json::from_str::<RecordObject>(&blob) {
            Ok(v) => v,
            Err(e) => {
                // skip malformed blobs. Other clients may have written them
                warn!("Skipping record with malformed _ob payload: {e}");
                continue;
            }
        };

        records.push(TimeRecordEntity::from_store_row(
            object.key,
            t1.and_then(datetime_from_epoch),
            t2.and_then(datetime_from_epoch),
            object.ds,
        ));
    }
    debug!("Fetched {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Timestamps come out of the store as epoch seconds, possibly fractional.
fn datetime_from_epoch(seconds: f64) -> Option<DateTime<Utc>> {
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}
