use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use serde::Deserialize;
use serde::Serialize;

/// One time-tracked activity record as handed to the aggregation core. Endpoints
/// are optional because upstream data can be partial, for example a record whose
/// timer is still running. `tags` is always derived from `description` before the
/// record reaches any aggregator.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct TimeRecordEntity {
    pub key: String,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub start: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub end: Option<DateTime<Utc>>,
    pub description: String,
    pub tags: Vec<String>,
}

impl TimeRecordEntity {
    /// Builds a record from raw store fields, running tag extraction on the
    /// description.
    pub fn from_store_row(
        key: String,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        description: String,
    ) -> Self {
        let tags = crate::analytics::tags::extract_tags(&description);
        Self {
            key,
            start,
            end,
            description,
            tags,
        }
    }

    /// Whole-record duration. Zero when either endpoint is missing, which keeps
    /// partial records visible to aggregations without contributing time.
    pub fn duration(&self) -> Duration {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end - start,
            _ => Duration::zero(),
        }
    }

    pub fn has_endpoints(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}
