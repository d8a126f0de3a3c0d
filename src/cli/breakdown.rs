use std::{collections::BTreeMap, path::PathBuf};

use ansi_term::{Colour, Style};
use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing::warn;

use crate::{
    analytics::{
        calendar::{format_period_label, Granularity},
        period_tags::{group_by_period_and_tags, PeriodTagMatrix},
    },
    storage::{
        discover::resolve_database_path,
        record_source::{RecordSource, SqliteRecordSource},
    },
    utils::{
        percentage::duration_percentage,
        time::{duration_to_seconds, format_duration},
    },
};

use super::range::{resolve_range, RangeArgs};

#[derive(Debug, Parser)]
pub struct BreakdownCommand {
    #[command(flatten)]
    range: RangeArgs,
    #[arg(
        short,
        long,
        default_value_t = Granularity::Weeks,
        help = "Bucket size for the breakdown"
    )]
    granularity: Granularity,
    #[arg(
        long,
        help = "Path to the record database. Defaults to $TIMETAGGER_DB_PATH or the timetagger data directory"
    )]
    db: Option<PathBuf>,
    #[arg(long, help = "Emit the table as json instead of text")]
    json: bool,
}

/// The per-period view: how much time went into each level 1 tag, period by
/// period, with records split exactly at period boundaries.
pub async fn process_breakdown_command(
    BreakdownCommand {
        range,
        granularity,
        db,
        json,
    }: BreakdownCommand,
) -> Result<()> {
    let range = resolve_range(&range)?;
    let source = SqliteRecordSource::new(resolve_database_path(db)?)?;
    let records = source.fetch_records(range.start, range.end).await?;

    let matrix = group_by_period_and_tags(&records, granularity);
    if matrix.skipped > 0 {
        warn!(
            "Skipped {} records missing a start or end timestamp",
            matrix.skipped
        );
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json_table(&matrix, granularity))?
        );
    } else {
        for line in render_matrix(&matrix, granularity) {
            println!("{line}");
        }
    }
    Ok(())
}

const BAR_WIDTH: usize = 40;

const TAG_PALETTE: [Colour; 6] = [
    Colour::Cyan,
    Colour::Green,
    Colour::Yellow,
    Colour::Purple,
    Colour::Blue,
    Colour::Red,
];

fn render_matrix(matrix: &PeriodTagMatrix, granularity: Granularity) -> Vec<String> {
    if matrix.is_empty() {
        return vec!["No records in the selected range".to_string()];
    }

    // tags get their colour from their position in the overall tag list, so a
    // tag keeps its colour from period to period
    let all_tags = matrix.tags().into_iter().collect::<Vec<_>>();

    let mut lines = Vec::new();
    for (period_key, period_tags) in &matrix.periods {
        lines.push(
            Style::new()
                .bold()
                .paint(format_period_label(period_key, granularity))
                .to_string(),
        );

        let total = matrix.period_total(period_key);
        let mut entries = period_tags.iter().collect::<Vec<_>>();
        entries.sort_by(|a, b| b.1.cmp(a.1));

        for (tag, duration) in entries {
            let share = duration_percentage(*duration, total);
            let cells = (*share / 100. * BAR_WIDTH as f64).round() as usize;
            lines.push(format!(
                "  {}\t{}\t{}%\t{}",
                tag,
                format_duration(*duration),
                *share as i32,
                tag_colour(&all_tags, tag).paint("█".repeat(cells)),
            ));
        }
        lines.push(String::new());
    }
    lines
}

fn tag_colour(all_tags: &[&str], tag: &str) -> Colour {
    let index = all_tags.iter().position(|t| *t == tag).unwrap_or(0);
    TAG_PALETTE[index % TAG_PALETTE.len()]
}

#[derive(Serialize)]
struct PeriodRow<'a> {
    key: &'a str,
    label: String,
    tags: BTreeMap<&'a str, f64>,
}

#[derive(Serialize)]
struct BreakdownTable<'a> {
    granularity: String,
    skipped: usize,
    periods: Vec<PeriodRow<'a>>,
}

fn json_table(matrix: &PeriodTagMatrix, granularity: Granularity) -> BreakdownTable<'_> {
    BreakdownTable {
        granularity: granularity.to_string(),
        skipped: matrix.skipped,
        periods: matrix
            .periods
            .iter()
            .map(|(key, tags)| PeriodRow {
                key,
                label: format_period_label(key, granularity),
                tags: tags
                    .iter()
                    .map(|(tag, duration)| (tag.as_str(), duration_to_seconds(*duration)))
                    .collect(),
            })
            .collect(),
    }
}
