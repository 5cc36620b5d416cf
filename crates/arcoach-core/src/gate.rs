//! Nudge eligibility decisions.
//!
//! The gate is a pure function of the metrics, the exclusion roster, the email
//! directory, and the nudge history. Every rejection carries a distinct
//! [`SkipReason`] so audit runs can report exactly why each recruiter was
//! passed over.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::history::NudgeHistory;
use crate::metrics::{MetricsReport, RecruiterMetrics};
use crate::policy::{saturating_sub, CoachPolicy};
use crate::records::{is_placeholder, EmailDirectory};

/// Why a recruiter is not nudged today. Variants are ordered the way the gate
/// checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InvalidName,
    Excluded,
    NoEmail,
    NoRecentActivity,
    NoMissedCandidates,
    UsageAtGoal,
    CooldownActive,
}

impl SkipReason {
    pub const ALL: [SkipReason; 7] = [
        SkipReason::InvalidName,
        SkipReason::Excluded,
        SkipReason::NoEmail,
        SkipReason::NoRecentActivity,
        SkipReason::NoMissedCandidates,
        SkipReason::UsageAtGoal,
        SkipReason::CooldownActive,
    ];
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SkipReason::InvalidName => "invalid recruiter name",
            SkipReason::Excluded => "excluded",
            SkipReason::NoEmail => "no email found",
            SkipReason::NoRecentActivity => "no recent activity",
            SkipReason::NoMissedCandidates => "no missed candidates",
            SkipReason::UsageAtGoal => "usage at or above goal",
            SkipReason::CooldownActive => "recently nudged",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Send { email: String },
    Skip { reason: SkipReason },
}

impl Decision {
    #[must_use]
    pub fn is_send(&self) -> bool {
        matches!(self, Decision::Send { .. })
    }

    #[must_use]
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Decision::Send { .. } => None,
            Decision::Skip { reason } => Some(*reason),
        }
    }
}

impl From<SkipReason> for Decision {
    fn from(reason: SkipReason) -> Self {
        Decision::Skip { reason }
    }
}

/// Eligibility rules, fixed at construction.
#[derive(Debug, Clone)]
pub struct NudgeGate {
    excluded: HashSet<String>,
    goal_percent: f64,
    cooldown: Duration,
}

impl NudgeGate {
    #[must_use]
    pub fn new<I, S>(excluded: I, goal_percent: f64, cooldown_days: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
            goal_percent,
            cooldown: Duration::days(i64::from(cooldown_days)),
        }
    }

    #[must_use]
    pub fn from_policy(policy: &CoachPolicy) -> Self {
        Self::new(
            policy.excluded_recruiters.iter().cloned(),
            policy.goal_percent,
            policy.cooldown_days,
        )
    }

    #[must_use]
    pub fn goal_percent(&self) -> f64 {
        self.goal_percent
    }

    fn check_identity(&self, recruiter: &str) -> Result<(), SkipReason> {
        if is_placeholder(recruiter) {
            return Err(SkipReason::InvalidName);
        }
        if self.excluded.contains(recruiter) {
            return Err(SkipReason::Excluded);
        }
        Ok(())
    }

    fn check_activity(
        &self,
        metrics: &RecruiterMetrics,
        last_sent: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), SkipReason> {
        if metrics.recent.eligible == 0 {
            return Err(SkipReason::NoRecentActivity);
        }
        if metrics.skipped_candidates.is_empty() {
            return Err(SkipReason::NoMissedCandidates);
        }
        if metrics.recent.percent >= self.goal_percent {
            return Err(SkipReason::UsageAtGoal);
        }
        if let Some(sent) = last_sent {
            if sent >= saturating_sub(now, self.cooldown) {
                return Err(SkipReason::CooldownActive);
            }
        }
        Ok(())
    }

    /// Metrics-and-history check, without the email directory lookup.
    ///
    /// # Errors
    ///
    /// Returns the first [`SkipReason`] that applies.
    pub fn check(
        &self,
        recruiter: &str,
        metrics: &RecruiterMetrics,
        last_sent: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), SkipReason> {
        self.check_identity(recruiter)?;
        self.check_activity(metrics, last_sent, now)
    }

    #[must_use]
    pub fn should_nudge(
        &self,
        recruiter: &str,
        metrics: &RecruiterMetrics,
        last_sent: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        self.check(recruiter, metrics, last_sent, now).is_ok()
    }

    /// Full decision for one recruiter, including the address lookup.
    #[must_use]
    pub fn evaluate(
        &self,
        recruiter: &str,
        metrics: &RecruiterMetrics,
        directory: &EmailDirectory,
        history: &NudgeHistory,
        now: DateTime<Utc>,
    ) -> Decision {
        if let Err(reason) = self.check_identity(recruiter) {
            return reason.into();
        }
        let Some(email) = directory.get(recruiter) else {
            return SkipReason::NoEmail.into();
        };
        match self.check_activity(metrics, history.last_sent(recruiter), now) {
            Ok(()) => Decision::Send {
                email: email.to_string(),
            },
            Err(reason) => reason.into(),
        }
    }

    /// Decide for every recruiter in the report, in name order.
    #[must_use]
    pub fn plan(
        &self,
        report: &MetricsReport,
        directory: &EmailDirectory,
        history: &NudgeHistory,
        now: DateTime<Utc>,
    ) -> NudgePlan {
        let entries = report
            .recruiters
            .iter()
            .map(|(recruiter, metrics)| PlannedNudge {
                recruiter: recruiter.clone(),
                decision: self.evaluate(recruiter, metrics, directory, history, now),
            })
            .collect();
        NudgePlan { entries }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedNudge {
    pub recruiter: String,
    #[serde(flatten)]
    pub decision: Decision,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NudgePlan {
    pub entries: Vec<PlannedNudge>,
}

impl NudgePlan {
    /// `(recruiter, email)` for every recruiter the gate lets through.
    pub fn recipients(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|entry| match &entry.decision {
            Decision::Send { email } => Some((entry.recruiter.as_str(), email.as_str())),
            Decision::Skip { .. } => None,
        })
    }

    #[must_use]
    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for entry in &self.entries {
            match entry.decision.skip_reason() {
                None => summary.would_send += 1,
                Some(reason) => *summary.skipped.entry(reason).or_insert(0) += 1,
            }
        }
        summary
    }
}

/// Decision counts for an audit report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub would_send: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl PlanSummary {
    #[must_use]
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
