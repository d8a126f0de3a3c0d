use std::path::PathBuf;

use ansi_term::Colour;
use anyhow::Result;
use chrono::Duration;
use clap::Parser;
use tracing::warn;

use crate::{
    analytics::{
        hierarchy::{build_hierarchy, TagNode},
        sunburst::{conservation_violations, flatten},
    },
    storage::{
        discover::resolve_database_path,
        record_source::{RecordSource, SqliteRecordSource},
    },
    utils::{percentage::duration_percentage, time::format_duration},
};

use super::range::{resolve_range, RangeArgs};

#[derive(Debug, Parser)]
pub struct DrilldownCommand {
    #[command(flatten)]
    range: RangeArgs,
    #[arg(
        short = 'n',
        long,
        default_value_t = 2,
        value_parser = clap::value_parser!(u8).range(1..=5),
        help = "Tag hierarchy depth"
    )]
    depth: u8,
    #[arg(
        long,
        help = "Path to the record database. Defaults to $TIMETAGGER_DB_PATH or the timetagger data directory"
    )]
    db: Option<PathBuf>,
    #[arg(long, help = "Emit sunburst rows as json instead of text")]
    json: bool,
}

/// The drill-down view: whole-record durations grouped along the tag hierarchy,
/// as a text tree or as flattened rows for a radial chart.
pub async fn process_drilldown_command(
    DrilldownCommand {
        range,
        depth,
        db,
        json,
    }: DrilldownCommand,
) -> Result<()> {
    let range = resolve_range(&range)?;
    let source = SqliteRecordSource::new(resolve_database_path(db)?)?;
    let records = source.fetch_records(range.start, range.end).await?;

    let root = build_hierarchy(&records, depth as usize);
    let rows = flatten(&root, depth as usize);

    for id in conservation_violations(&rows) {
        // data or config issue upstream, the chart itself stays usable
        warn!("Children of {id:?} sum to more than their parent");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for line in render_tree(&root, depth as usize) {
            println!("{line}");
        }
    }
    Ok(())
}

const DEPTH_PALETTE: [Colour; 5] = [
    Colour::Cyan,
    Colour::Green,
    Colour::Yellow,
    Colour::Purple,
    Colour::Blue,
];

fn render_tree(root: &TagNode, max_depth: usize) -> Vec<String> {
    let total = root.value();
    if root.children.is_empty() {
        return vec!["No records in the selected range".to_string()];
    }

    let mut lines = vec![format!("Total\t{}", format_duration(total))];
    render_children(root, total, 0, max_depth, &mut lines);
    lines
}

fn render_children(
    node: &TagNode,
    parent_value: Duration,
    depth: usize,
    max_depth: usize,
    lines: &mut Vec<String>,
) {
    for (label, child) in &node.children {
        let value = child.value();
        // mirror the chart: zero-value branches would be invisible anyway
        if value <= Duration::zero() {
            continue;
        }
        let share = duration_percentage(value, parent_value);
        lines.push(format!(
            "{}{}\t{}\t{}%",
            "  ".repeat(depth + 1),
            DEPTH_PALETTE[depth % DEPTH_PALETTE.len()].paint(label.as_str()),
            format_duration(value),
            *share as i32,
        ));
        if depth + 1 < max_depth {
            render_children(child, value, depth + 1, max_depth, lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::{analytics::hierarchy::build_hierarchy, storage::entities::TimeRecordEntity};

    use super::render_tree;

    fn record(description: &str, hours: i64) -> TimeRecordEntity {
        let start: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
        TimeRecordEntity::from_store_row(
            description.to_string(),
            Some(start),
            Some(start + Duration::hours(hours)),
            description.to_string(),
        )
    }

    #[test]
    fn renders_total_then_indented_branches() {
        let records = [record("#work #projA", 3), record("#play", 1)];
        let root = build_hierarchy(&records, 2);
        let lines = render_tree(&root, 2);

        assert_eq!(lines[0], "Total\t4h0m0s");
        let work_line = lines.iter().find(|l| l.contains("work")).unwrap();
        assert!(work_line.contains("3h0m0s"));
        assert!(work_line.contains("75%"));
        let proj_line = lines.iter().find(|l| l.contains("projA")).unwrap();
        // projA is all of work's time
        assert!(proj_line.contains("100%"));
        assert!(proj_line.starts_with("    "));
    }

    #[test]
    fn zero_duration_branches_are_hidden() {
        let records = [record("#idle", 0), record("#work", 2)];
        let root = build_hierarchy(&records, 1);
        let lines = render_tree(&root, 1);

        assert!(lines.iter().all(|l| !l.contains("idle")));
    }

    #[test]
    fn empty_tree_renders_a_placeholder() {
        let root = build_hierarchy(&[], 2);
        assert_eq!(
            render_tree(&root, 2),
            vec!["No records in the selected range".to_string()]
        );
    }
}
