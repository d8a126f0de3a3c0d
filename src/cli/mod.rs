pub mod breakdown;
pub mod drilldown;
pub mod range;
pub mod summary;

use std::{env, io, path::PathBuf};

use anyhow::Result;
use breakdown::{process_breakdown_command, BreakdownCommand};
use clap::{Parser, Subcommand};
use drilldown::{process_drilldown_command, DrilldownCommand};
use summary::{process_summary_command, SummaryCommand};
use tracing::level_filters::LevelFilter;

use crate::utils::logging::enable_logging;

#[derive(Parser, Debug)]
#[command(name = "Tagtally", version, long_about = None)]
#[command(about = "Analytics for time-tagged activity records", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Break down time per period by level 1 tag")]
    Breakdown {
        #[command(flatten)]
        command: BreakdownCommand,
    },
    #[command(about = "Drill down into the tag hierarchy")]
    Drilldown {
        #[command(flatten)]
        command: DrilldownCommand,
    },
    #[command(about = "Overall statistics for the selected range")]
    Summary {
        #[command(flatten)]
        command: SummaryCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&create_application_default_path()?, logging_level, args.log)?;

    match args.commands {
        Commands::Breakdown { command } => process_breakdown_command(command).await,
        Commands::Drilldown { command } => process_drilldown_command(command).await,
        Commands::Summary { command } => process_summary_command(command).await,
    }
}

pub fn create_application_default_path() -> Result<PathBuf> {
    let path = {
        #[cfg(windows)]
        {
            let mut path =
                PathBuf::from(env::var("APPDATA").expect("APPDATA should be present on Windows"));
            path.push("tagtally");
            path
        }
        #[cfg(not(windows))]
        {
            let mut path = env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .expect("Couldn't find neither XDG_STATE_HOME nor HOME");
            path.push("tagtally");
            path
        }
    };

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}
