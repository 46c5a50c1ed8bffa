//! Benchmark report structures.
//!
//! A batch run produces one [`PolicyRun`] row per candidate policy plus
//! shared [`RunMetadata`], serialized as a single JSON artifact for the
//! external reporting/ranking side.

use chrono::Utc;
use serde::Serialize;

use crate::sim::RunStats;

/// Schema version stamped into every artifact so downstream consumers can
/// detect layout changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Completed-run statistics for one policy.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunReport {
    pub hit_count: u64,
    pub miss_count: u64,
    pub hit_rate: f64,
    /// `miss_count / access_count`; the ranking score (lower is better).
    pub miss_ratio: f64,
    pub access_count: u64,
    pub eviction_count: u64,
    /// Requests skipped because the object could never fit.
    pub too_large_skips: u64,
    /// Occupied size at end of replay.
    pub final_occupancy: u64,
    /// Resident entry count at end of replay.
    pub final_entries: usize,
}

impl RunReport {
    pub fn from_stats(stats: &RunStats, final_occupancy: u64, final_entries: usize) -> Self {
        Self {
            hit_count: stats.hits,
            miss_count: stats.misses,
            hit_rate: stats.hit_rate(),
            miss_ratio: stats.miss_ratio(),
            access_count: stats.requests,
            eviction_count: stats.evictions,
            too_large_skips: stats.too_large,
            final_occupancy,
            final_entries,
        }
    }
}

/// Terminal status of one policy's run within a batch.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed(RunReport),
    /// The policy violated the eviction contract; its run was aborted.
    PolicyDefect { error: String },
    /// The run exceeded its step budget and its statistics were discarded.
    BudgetExceeded { steps: u64 },
}

impl RunOutcome {
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// One row of a batch artifact.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PolicyRun {
    pub policy_id: String,
    pub policy_name: String,
    #[serde(flatten)]
    pub outcome: RunOutcome,
}

/// Environment and configuration shared by every row of a batch.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunMetadata {
    pub timestamp: String,
    pub engine_version: &'static str,
    pub capacity: u64,
    pub trace_len: usize,
    pub step_budget: Option<u64>,
}

impl RunMetadata {
    pub fn collect(capacity: u64, trace_len: usize, step_budget: Option<u64>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            engine_version: env!("CARGO_PKG_VERSION"),
            capacity,
            trace_len,
            step_budget,
        }
    }
}

/// Full artifact for one batch evaluation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchReport {
    pub schema_version: u32,
    pub metadata: RunMetadata,
    pub runs: Vec<PolicyRun>,
}

impl BatchReport {
    pub fn new(metadata: RunMetadata, runs: Vec<PolicyRun>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            metadata,
            runs,
        }
    }

    /// Rows whose run completed, with their reports.
    pub fn completed(&self) -> impl Iterator<Item = (&PolicyRun, &RunReport)> {
        self.runs
            .iter()
            .filter_map(|run| run.outcome.report().map(|report| (run, report)))
    }

    /// The completed run with the lowest miss ratio, if any completed.
    pub fn best(&self) -> Option<&PolicyRun> {
        self.completed()
            .min_by(|(_, a), (_, b)| {
                a.miss_ratio
                    .partial_cmp(&b.miss_ratio)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(run, _)| run)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
