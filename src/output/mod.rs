//! Output module for reporting on the index
//!
//! This module handles:
//! - Loading index statistics from the store
//! - Rendering statistics and the top ranked documents

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics, IndexStatistics};

use crate::storage::RunRecord;
use chrono::{DateTime, Utc};

/// Wall-clock duration of a finished run, in seconds
pub fn run_duration_seconds(run: &RunRecord) -> Option<u64> {
    let started = run.started_at.parse::<DateTime<Utc>>().ok()?;
    let finished = run.finished_at.as_ref()?.parse::<DateTime<Utc>>().ok()?;
    u64::try_from((finished - started).num_seconds()).ok()
}
