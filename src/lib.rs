//! Cli for analyzing time-tagged activity records. Reads a timetagger database,
//! rebuilds the tag structure hidden in record descriptions, and shows where the
//! time went per day, week or month, or along the tag hierarchy.
//!

pub mod analytics;
pub mod cli;
pub mod storage;
pub mod utils;
