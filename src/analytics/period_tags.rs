use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;
use tracing::debug;

use crate::storage::entities::TimeRecordEntity;

use super::{calendar::Granularity, split::split_across_periods};

/// Bucket for records whose description carries no tags at all.
pub const NO_TAGS: &str = "No tags";

/// Period × tag duration matrix, the data behind the stacked per-period view.
/// Period keys sort chronologically because the calendar keys are built that way,
/// so iterating the outer map walks the timeline in order.
#[derive(Debug, Default, PartialEq)]
pub struct PeriodTagMatrix {
    pub periods: BTreeMap<String, BTreeMap<String, Duration>>,
    /// Records dropped because they were missing an endpoint. Partial data is
    /// expected from upstream, the caller decides whether to surface the count.
    pub skipped: usize,
}

impl PeriodTagMatrix {
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// All tags appearing anywhere in the matrix, sorted.
    pub fn tags(&self) -> BTreeSet<&str> {
        self.periods
            .values()
            .flat_map(|tags| tags.keys().map(String::as_str))
            .collect()
    }

    pub fn get(&self, period_key: &str, tag: &str) -> Duration {
        self.periods
            .get(period_key)
            .and_then(|tags| tags.get(tag))
            .copied()
            .unwrap_or_else(Duration::zero)
    }

    pub fn period_total(&self, period_key: &str) -> Duration {
        self.periods
            .get(period_key)
            .map(|tags| {
                tags.values()
                    .fold(Duration::zero(), |acc, duration| acc + *duration)
            })
            .unwrap_or_else(Duration::zero)
    }
}

/// Groups records by period and level 1 tag, splitting each record across every
/// period it overlaps. Only the first tag of a record counts here; the deeper
/// structure belongs to the hierarchy view.
pub fn group_by_period_and_tags(
    records: &[TimeRecordEntity],
    granularity: Granularity,
) -> PeriodTagMatrix {
    let mut matrix = PeriodTagMatrix::default();

    for record in records {
        let (Some(start), Some(end)) = (record.start, record.end) else {
            matrix.skipped += 1;
            continue;
        };

        let tag = record.tags.first().map(String::as_str).unwrap_or(NO_TAGS);

        for (period_key, duration) in split_across_periods(start, end, granularity) {
            let slot = matrix
                .periods
                .entry(period_key)
                .or_default()
                .entry(tag.to_string())
                .or_insert_with(Duration::zero);
            *slot = *slot + duration;
        }
    }

    if matrix.skipped > 0 {
        debug!(
            "Skipped {} records missing a start or end timestamp",
            matrix.skipped
        );
    }

    matrix
}
