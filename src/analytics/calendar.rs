use std::fmt::Display;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::ValueEnum;
use now::DateTimeNow;
use thiserror::Error;

/// Bucket size used to partition the timeline. Periods of one granularity cover the
/// timeline completely with no gaps or overlaps, so every timestamp belongs to
/// exactly one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Granularity {
    Days,
    Weeks,
    Months,
}

impl Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Days => write!(f, "days"),
            Granularity::Weeks => write!(f, "weeks"),
            Granularity::Months => write!(f, "months"),
        }
    }
}

impl Granularity {
    /// Parses a granularity name, falling back to days for anything unrecognized.
    /// Keys and config arrive as free strings from outside the crate, and a usable
    /// default beats an error there.
    pub fn parse_lenient(value: &str) -> Granularity {
        match value.to_ascii_lowercase().as_str() {
            "week" | "weeks" => Granularity::Weeks,
            "month" | "months" => Granularity::Months,
            _ => Granularity::Days,
        }
    }
}

/// A period key could not be mapped back to period bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {granularity} period key {key:?}")]
pub struct InvalidPeriodKey {
    pub key: String,
    pub granularity: Granularity,
}

/// Returns the half-open `[start, end)` bounds of the period containing `t`.
/// Days start at midnight, weeks start on Monday, months start on the first.
pub fn period_bounds(t: DateTime<Utc>, granularity: Granularity) -> (DateTime<Utc>, DateTime<Utc>) {
    match granularity {
        Granularity::Days => {
            let start = t.beginning_of_day();
            (start, start + Duration::days(1))
        }
        Granularity::Weeks => {
            let start = t.beginning_of_week();
            (start, start + Duration::days(7))
        }
        Granularity::Months => {
            let start = t.beginning_of_month();
            (start, next_month_start(start))
        }
    }
}

/// Returns the canonical string key of the period containing `t`. Keys of one
/// granularity sort lexically in chronological order, and every key round-trips
/// through [bounds_for_key].
pub fn period_key(t: DateTime<Utc>, granularity: Granularity) -> String {
    match granularity {
        Granularity::Days => t.format("%Y-%m-%d").to_string(),
        Granularity::Weeks => {
            let monday = t.beginning_of_week().date_naive();
            format!("{}-W{:02}", monday.year(), monday_week_number(monday))
        }
        Granularity::Months => t.format("%Y-%m").to_string(),
    }
}

/// Inverse of [period_key]: maps a canonical key back to the period's `[start, end)`
/// bounds. Malformed keys produce [InvalidPeriodKey].
pub fn bounds_for_key(
    key: &str,
    granularity: Granularity,
) -> Result<(DateTime<Utc>, DateTime<Utc>), InvalidPeriodKey> {
    let invalid = || InvalidPeriodKey {
        key: key.to_string(),
        granularity,
    };
    match granularity {
        Granularity::Days => {
            let date = NaiveDate::parse_from_str(key, "%Y-%m-%d").map_err(|_| invalid())?;
            let start = start_of_date(date);
            Ok((start, start + Duration::days(1)))
        }
        Granularity::Weeks => {
            let (year, week) = key.split_once("-W").ok_or_else(invalid)?;
            let year = year.parse::<i32>().map_err(|_| invalid())?;
            let week = week.parse::<u32>().map_err(|_| invalid())?;
            // emitted keys always name the Monday's year, which puts them in 1..=53
            if !(1..=53).contains(&week) {
                return Err(invalid());
            }
            let start = start_of_date(first_monday_of_year(year).ok_or_else(invalid)?)
                + Duration::days((week as i64 - 1) * 7);
            Ok((start, start + Duration::days(7)))
        }
        Granularity::Months => {
            let date =
                NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d").map_err(|_| invalid())?;
            let start = start_of_date(date);
            Ok((start, next_month_start(start)))
        }
    }
}

/// Human readable label for a period key, e.g. "Jan 05, 2024", "Week 2, 2024" or
/// "January 2024". Presentation only. A key that doesn't parse is returned as is
/// so a renderer never loses a column over it.
pub fn format_period_label(key: &str, granularity: Granularity) -> String {
    let Ok((start, _)) = bounds_for_key(key, granularity) else {
        return key.to_string();
    };
    match granularity {
        Granularity::Days => start.format("%b %d, %Y").to_string(),
        Granularity::Weeks => format!(
            "Week {}, {}",
            monday_week_number(start.date_naive()),
            start.year()
        ),
        Granularity::Months => start.format("%B %Y").to_string(),
    }
}

/// Monday-based week number: week 1 starts at the first Monday of the year, days
/// before it belong to week 0.
fn monday_week_number(date: NaiveDate) -> u32 {
    (date.ordinal0() + 7 - date.weekday().num_days_from_monday()) / 7
}

fn first_monday_of_year(year: i32) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let offset = (7 - jan1.weekday().num_days_from_monday()) % 7;
    Some(jan1 + Duration::days(offset as i64))
}

fn next_month_start(start: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if start.month() == 12 {
        (start.year() + 1, 1)
    } else {
        (start.year(), start.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap()
}

fn start_of_date(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::{
        bounds_for_key, format_period_label, period_bounds, period_key, Granularity,
    };

    fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn day_bounds_cover_midnight_to_midnight() {
        let (start, end) = period_bounds(utc(2024, 1, 5, 13, 45), Granularity::Days);
        assert_eq!(start, utc(2024, 1, 5, 0, 0));
        assert_eq!(end, utc(2024, 1, 6, 0, 0));
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-01-10 is a Wednesday, the Monday of that week is 2024-01-08
        let (start, end) = period_bounds(utc(2024, 1, 10, 9, 30), Granularity::Weeks);
        assert_eq!(start, utc(2024, 1, 8, 0, 0));
        assert_eq!(end - start, Duration::days(7));
    }

    #[test]
    fn month_rollover_into_next_year() {
        let (start, end) = period_bounds(utc(2024, 12, 15, 8, 0), Granularity::Months);
        assert_eq!(start, utc(2024, 12, 1, 0, 0));
        assert_eq!(end, utc(2025, 1, 1, 0, 0));
    }

    #[test]
    fn keys_round_trip_and_contain_their_timestamp() {
        let samples = [
            utc(2024, 1, 1, 0, 0),
            utc(2024, 2, 29, 12, 0),
            utc(2024, 12, 31, 23, 59),
            utc(2025, 1, 1, 0, 0),
            utc(2023, 6, 15, 4, 20),
        ];
        for granularity in [Granularity::Days, Granularity::Weeks, Granularity::Months] {
            for t in samples {
                let key = period_key(t, granularity);
                let (start, end) = bounds_for_key(&key, granularity).unwrap();
                assert!(start <= t && t < end, "{key} {granularity} {t}");
                assert_eq!((start, end), period_bounds(t, granularity));
            }
        }
    }

    #[test]
    fn consecutive_periods_share_a_boundary() {
        for granularity in [Granularity::Days, Granularity::Weeks, Granularity::Months] {
            let (_, end) = period_bounds(utc(2024, 12, 15, 10, 0), granularity);
            let (next_start, _) = period_bounds(end, granularity);
            assert_eq!(end, next_start, "{granularity}");
        }
    }

    #[test]
    fn week_key_uses_the_mondays_year() {
        // 2024-12-30 is a Monday whose week spills into 2025
        let key = period_key(utc(2025, 1, 1, 10, 0), Granularity::Weeks);
        assert_eq!(key, "2024-W53");
        let (start, end) = bounds_for_key(&key, Granularity::Weeks).unwrap();
        assert_eq!(start, utc(2024, 12, 30, 0, 0));
        assert_eq!(end, utc(2025, 1, 6, 0, 0));
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(bounds_for_key("2024-13-40", Granularity::Days).is_err());
        assert!(bounds_for_key("garbage", Granularity::Weeks).is_err());
        assert!(bounds_for_key("2024-W00", Granularity::Weeks).is_err());
        assert!(bounds_for_key("2024-W99", Granularity::Weeks).is_err());
        assert!(bounds_for_key("2024", Granularity::Months).is_err());
        let err = bounds_for_key("nope", Granularity::Days).unwrap_err();
        assert_eq!(err.key, "nope");
    }

    #[test]
    fn lenient_parsing_falls_back_to_days() {
        assert_eq!(Granularity::parse_lenient("weeks"), Granularity::Weeks);
        assert_eq!(Granularity::parse_lenient("Month"), Granularity::Months);
        assert_eq!(Granularity::parse_lenient("fortnights"), Granularity::Days);
        assert_eq!(Granularity::parse_lenient(""), Granularity::Days);
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(format_period_label("2024-01-05", Granularity::Days), "Jan 05, 2024");
        assert_eq!(format_period_label("2024-W02", Granularity::Weeks), "Week 2, 2024");
        assert_eq!(format_period_label("2024-01", Granularity::Months), "January 2024");
        // unparseable keys pass through untouched
        assert_eq!(format_period_label("???", Granularity::Days), "???");
    }
}
