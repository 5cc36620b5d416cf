//! Per-recruiter AI-interview adoption metrics.
//!
//! Every row passes the same filters (timestamp, recruiter, historical start,
//! eligible stage, seniority) before it counts toward the historical window.
//! The recent window is the subset applied at or after `now - recent_window_days`,
//! so recent counts never exceed historical ones.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::policy::CoachPolicy;
use crate::records::{is_placeholder, PipelineRecord};

/// Dropped rows logged individually before falling back to counts only.
const MAX_LOGGED_DROPS: usize = 5;

const MISSING_CELL: &str = "N/A";

/// Counts for one time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WindowCounts {
    pub eligible: u32,
    pub ai_done: u32,
    /// `ai_done / eligible × 100`, one decimal; `0.0` when nothing is eligible.
    pub percent: f64,
}

impl WindowCounts {
    fn count(&mut self, ai_done: bool) {
        self.eligible += 1;
        if ai_done {
            self.ai_done += 1;
        }
    }

    fn finalize(&mut self) {
        self.percent = adoption_percent(self.ai_done, self.eligible);
    }
}

/// Adoption rate rounded to one decimal place, zero-guarded.
#[must_use]
pub fn adoption_percent(ai_done: u32, eligible: u32) -> f64 {
    if eligible == 0 {
        return 0.0;
    }
    let ratio = f64::from(ai_done) / f64::from(eligible);
    (ratio * 1000.0).round() / 10.0
}

/// A recent, eligible candidate who did not get an AI interview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCandidate {
    pub name: String,
    pub title: String,
    /// Normalized (uppercased) stage label.
    pub stage: String,
    pub source: String,
    pub company: String,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecruiterMetrics {
    pub historical: WindowCounts,
    pub recent: WindowCounts,
    /// In sheet row order.
    pub skipped_candidates: Vec<SkippedCandidate>,
}

impl RecruiterMetrics {
    /// Recent minus historical adoption, in percentage points.
    #[must_use]
    pub fn change(&self) -> f64 {
        self.recent.percent - self.historical.percent
    }
}

/// Why rows were left out of the metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub total_rows: usize,
    pub missing_timestamp: usize,
    pub invalid_recruiter: usize,
    pub before_historical_start: usize,
    pub ineligible_stage: usize,
    pub senior_position: usize,
    pub counted: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsReport {
    pub recruiters: BTreeMap<String, RecruiterMetrics>,
    pub stats: FilterStats,
}

impl MetricsReport {
    #[must_use]
    pub fn get(&self, recruiter: &str) -> Option<&RecruiterMetrics> {
        self.recruiters.get(recruiter)
    }
}

fn or_missing(cell: &str) -> String {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        MISSING_CELL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Compute adoption metrics for every recruiter with at least one eligible row.
///
/// Malformed rows never fail the computation; each is dropped and counted in
/// [`FilterStats`].
#[must_use]
pub fn compute_metrics(
    records: &[PipelineRecord],
    policy: &CoachPolicy,
    now: DateTime<Utc>,
) -> MetricsReport {
    let historical_start = policy.historical_start_at();
    let recent_cutoff = policy.recent_cutoff(now);

    let mut stats = FilterStats {
        total_rows: records.len(),
        ..FilterStats::default()
    };
    let mut recruiters: BTreeMap<String, RecruiterMetrics> = BTreeMap::new();

    for record in records {
        let Some(applied_at) = record.applied_at else {
            stats.missing_timestamp += 1;
            continue;
        };

        let recruiter = record.recruiter.trim();
        if is_placeholder(recruiter) {
            stats.invalid_recruiter += 1;
            if stats.invalid_recruiter <= MAX_LOGGED_DROPS {
                tracing::debug!(
                    row = record.row_number,
                    recruiter = %recruiter,
                    stage = %record.stage,
                    "skipping row with invalid recruiter"
                );
            }
            continue;
        }

        if applied_at < historical_start {
            stats.before_historical_start += 1;
            continue;
        }

        let stage = record.stage.trim().to_uppercase();
        if !policy.is_eligible_stage(&stage) {
            stats.ineligible_stage += 1;
            continue;
        }

        if policy.is_senior_title(&record.title) {
            stats.senior_position += 1;
            if stats.senior_position <= MAX_LOGGED_DROPS {
                tracing::debug!(
                    row = record.row_number,
                    recruiter = %recruiter,
                    title = %record.title,
                    "skipping senior-level position"
                );
            }
            continue;
        }

        stats.counted += 1;
        let ai_done = record.ai_interview.trim().to_uppercase() == "Y";
        let metrics = recruiters.entry(recruiter.to_string()).or_default();

        metrics.historical.count(ai_done);

        if applied_at >= recent_cutoff {
            metrics.recent.count(ai_done);
            if !ai_done {
                metrics.skipped_candidates.push(SkippedCandidate {
                    name: or_missing(&record.candidate_name),
                    title: or_missing(&record.title),
                    stage,
                    source: or_missing(&record.source),
                    company: or_missing(&record.company),
                    applied_at,
                });
            }
        }
    }

    for metrics in recruiters.values_mut() {
        metrics.historical.finalize();
        metrics.recent.finalize();
    }

    tracing::info!(
        total_rows = stats.total_rows,
        missing_timestamp = stats.missing_timestamp,
        invalid_recruiter = stats.invalid_recruiter,
        before_historical_start = stats.before_historical_start,
        ineligible_stage = stats.ineligible_stage,
        senior_position = stats.senior_position,
        recruiters = recruiters.len(),
        "pipeline metrics computed"
    );

    MetricsReport { recruiters, stats }
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod tests;
