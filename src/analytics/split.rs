use chrono::{DateTime, Duration, Utc};

use super::calendar::{period_bounds, period_key, Granularity};

/// Partitions the half-open interval `[start, end)` into one contribution per
/// period it overlaps. The contributions are contiguous, so their durations add
/// up to exactly `end - start`.
///
/// A degenerate interval (`end <= start`) yields a single zero-duration
/// contribution for the period containing `start`, so record-counting
/// aggregations still see it.
pub fn split_across_periods(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    granularity: Granularity,
) -> Vec<(String, Duration)> {
    if end <= start {
        return vec![(period_key(start, granularity), Duration::zero())];
    }

    let mut contributions = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let (_, period_end) = period_bounds(cursor, granularity);
        let overlap_end = end.min(period_end);
        contributions.push((period_key(cursor, granularity), overlap_end - cursor));
        cursor = period_end;
    }
    contributions
}
