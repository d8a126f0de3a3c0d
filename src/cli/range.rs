use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};
use now::DateTimeNow;

use crate::utils::time::next_day_start;

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct RangeArgs {
    #[arg(
        long = "start",
        short,
        help = "Start of the range. Examples are \"yesterday\", \"1 hour ago\", \"15/03/2025\""
    )]
    start_date: Option<String>,
    #[arg(long = "end", short, help = "End of the range. Same formats as --start")]
    end_date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

/// Range bounds in the store's timezone. A missing bound leaves that side open
/// so the whole database is covered by default.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Parses the optional range bounds and widens them to whole local days: the
/// start snaps back to its midnight, the end forward to the next one.
pub fn resolve_range(args: &RangeArgs) -> Result<ResolvedRange> {
    let now = Local::now();
    let dialect: chrono_english::Dialect = args.date_style.into();

    let start = match args
        .start_date
        .as_deref()
        .map(|s| parse_date_string(s, now, dialect))
    {
        Some(Ok(v)) => Some(v.with_timezone(&Local).beginning_of_day().to_utc()),
        Some(Err(e)) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate start date {e}"),
                )
                .into());
        }
        None => None,
    };
    let end = match args
        .end_date
        .as_deref()
        .map(|s| parse_date_string(s, now, dialect))
    {
        Some(Ok(v)) => Some(next_day_start(v.with_timezone(&Local)).to_utc()),
        Some(Err(e)) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate end date {e}"),
                )
                .into());
        }
        None => None,
    };

    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    "Start date must be before end date",
                )
                .into());
        }
    }

    Ok(ResolvedRange { start, end })
}
