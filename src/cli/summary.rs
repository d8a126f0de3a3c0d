use std::{collections::HashSet, path::PathBuf};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use serde::Serialize;

use crate::{
    storage::{
        discover::resolve_database_path,
        entities::TimeRecordEntity,
        record_source::{RecordSource, SqliteRecordSource},
    },
    utils::time::{duration_to_seconds, format_duration},
};

use super::range::{resolve_range, RangeArgs};

#[derive(Debug, Parser)]
pub struct SummaryCommand {
    #[command(flatten)]
    range: RangeArgs,
    #[arg(
        long,
        help = "Path to the record database. Defaults to $TIMETAGGER_DB_PATH or the timetagger data directory"
    )]
    db: Option<PathBuf>,
    #[arg(long, help = "Emit the summary as json instead of text")]
    json: bool,
}

/// Headline numbers for the selected range, the figures a dashboard would show
/// above its charts.
pub async fn process_summary_command(
    SummaryCommand { range, db, json }: SummaryCommand,
) -> Result<()> {
    let range = resolve_range(&range)?;
    let source = SqliteRecordSource::new(resolve_database_path(db)?)?;
    let records = source.fetch_records(range.start, range.end).await?;

    let summary = summarize(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for line in render_summary(&summary) {
            println!("{line}");
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct Summary {
    records: usize,
    total_seconds: f64,
    average_seconds: f64,
    unique_tags: usize,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    first_start: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    last_end: Option<DateTime<Utc>>,
}

fn summarize(records: &[TimeRecordEntity]) -> Summary {
    let total = records
        .iter()
        .fold(Duration::zero(), |acc, record| acc + record.duration());
    let average = if records.is_empty() {
        Duration::zero()
    } else {
        total / records.len() as i32
    };
    let unique_tags = records
        .iter()
        .flat_map(|record| record.tags.iter().map(String::as_str))
        .collect::<HashSet<_>>()
        .len();

    Summary {
        records: records.len(),
        total_seconds: duration_to_seconds(total),
        average_seconds: duration_to_seconds(average),
        unique_tags,
        first_start: records.iter().filter_map(|record| record.start).min(),
        last_end: records.iter().filter_map(|record| record.end).max(),
    }
}

fn render_summary(summary: &Summary) -> Vec<String> {
    let mut lines = vec![
        format!("Records\t\t{}", summary.records),
        format!(
            "Total time\t{}",
            format_duration(Duration::seconds(summary.total_seconds as i64))
        ),
        format!(
            "Average\t\t{}",
            format_duration(Duration::seconds(summary.average_seconds as i64))
        ),
        format!("Unique tags\t{}", summary.unique_tags),
    ];
    if let (Some(first), Some(last)) = (summary.first_start, summary.last_end) {
        lines.push(format!(
            "Range\t\t{} - {}",
            first.format("%b %d, %Y"),
            last.format("%b %d, %Y")
        ));
    }
    lines
}
