use chrono::{DateTime, Duration, NaiveTime, TimeZone};

/// Returns start of the next day.
pub fn next_day_start<Tz: TimeZone>(date: DateTime<Tz>) -> DateTime<Tz> {
    (date + Duration::days(1)).with_time(NaiveTime::MIN).unwrap()
}

/// Duration as fractional seconds, for json output and chart sinks.
pub fn duration_to_seconds(duration: Duration) -> f64 {
    duration.num_seconds() as f64 + duration.subsec_nanos() as f64 / 1e9
}

/// Compact duration formatting for terminal output, e.g. 2h30m0s.
pub fn format_duration(v: Duration) -> String {
    if v.num_hours() > 0 {
        format!(
            "{}h{}m{}s",
            v.num_hours(),
            v.num_minutes() % 60,
            v.num_seconds() % 60
        )
    } else if v.num_minutes() > 0 {
        format!("{}m{}s", v.num_minutes() % 60, v.num_seconds() % 60)
    } else {
        format!("{}s", v.num_seconds() % 60)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{duration_to_seconds, format_duration, next_day_start};

    #[test]
    fn next_day_starts_at_midnight() {
        let date = Utc.with_ymd_and_hms(2024, 12, 31, 18, 45, 12).unwrap();
        assert_eq!(
            next_day_start(date),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn seconds_keep_their_fraction() {
        let duration = Duration::milliseconds(1500);
        assert_eq!(duration_to_seconds(duration), 1.5);
    }

    #[test]
    fn durations_format_compactly() {
        assert_eq!(format_duration(Duration::seconds(42)), "42s");
        assert_eq!(format_duration(Duration::seconds(150)), "2m30s");
        assert_eq!(format_duration(Duration::seconds(9000)), "2h30m0s");
    }
}
