//! Daily nudge batch.
//!
//! Reads the pipeline, computes metrics, plans decisions against the nudge
//! history, and for each recruiter the gate lets through: generates a message,
//! renders and sends the email, then records the send. Recruiters are handled
//! one at a time. A failed generation skips that recruiter; a failed send or
//! history write aborts the rest of the batch without undoing earlier sends.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, Utc, Weekday};
use serde::Serialize;
use thiserror::Error;

use crate::email::{EmailError, EmailRenderer, OutgoingEmail, NUDGE_SUBJECT};
use crate::gate::{NudgeGate, NudgePlan, PlanSummary, SkipReason};
use crate::history::NudgeHistory;
use crate::metrics::{compute_metrics, FilterStats, MetricsReport, RecruiterMetrics};
use crate::policy::CoachPolicy;
use crate::ports::{NotificationSender, NudgeHistoryStore, PipelineSource, TextGenerator};
use crate::prompt::build_nudge_prompt;
use crate::records::{EmailDirectory, PipelineTable};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{stage} failed: {source}")]
    Collaborator {
        stage: &'static str,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error("no metrics for recruiter {0:?}")]
    UnknownRecruiter(String),

    #[error("reviewer_email is not set in the coaching policy")]
    NoReviewer,

    #[error("text generation returned no message for {0:?}")]
    GenerationFailed(String),
}

fn at_stage<E>(stage: &'static str) -> impl FnOnce(E) -> RunError
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |source| RunError::Collaborator {
        stage,
        source: Box::new(source),
    }
}

/// Pipeline state for one point in time.
#[derive(Debug, Clone)]
pub struct PipelineSnapshot {
    pub report: MetricsReport,
    pub directory: EmailDirectory,
    pub missing_columns: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    /// Whether a scheduled run at `generated_at` would skip for the weekend.
    pub weekend: bool,
    pub stats: FilterStats,
    pub missing_columns: Vec<&'static str>,
    pub plan: NudgePlan,
    pub summary: PlanSummary,
}

impl AuditReport {
    pub fn would_receive(&self) -> impl Iterator<Item = &str> {
        self.plan.recipients().map(|(recruiter, _)| recruiter)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub recruiters: usize,
    pub planned: usize,
    pub sent: usize,
    pub generation_failures: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    SkippedWeekend,
    Completed(RunSummary),
}

struct PreparedRun {
    snapshot: PipelineSnapshot,
    plan: NudgePlan,
}

/// Drives metrics, gating, and delivery over the pipeline and history stores.
///
/// Text generation and mail delivery are passed per call so read-only
/// commands never need their credentials.
pub struct NudgeRunner<P, H> {
    pipeline: P,
    history: H,
    policy: CoachPolicy,
    gate: NudgeGate,
    renderer: EmailRenderer,
    offset: FixedOffset,
}

impl<P, H> NudgeRunner<P, H>
where
    P: PipelineSource,
    H: NudgeHistoryStore,
{
    /// # Errors
    ///
    /// Returns [`RunError::Email`] if the email template cannot be loaded.
    pub fn new(
        pipeline: P,
        history: H,
        policy: CoachPolicy,
        offset: FixedOffset,
    ) -> Result<Self, RunError> {
        let gate = NudgeGate::from_policy(&policy);
        Ok(Self {
            pipeline,
            history,
            policy,
            gate,
            renderer: EmailRenderer::new()?,
            offset,
        })
    }

    /// Saturday or Sunday in the configured local offset.
    #[must_use]
    pub fn is_weekend(&self, now: DateTime<Utc>) -> bool {
        matches!(
            now.with_timezone(&self.offset).weekday(),
            Weekday::Sat | Weekday::Sun
        )
    }

    /// # Errors
    ///
    /// Returns [`RunError::Collaborator`] if the pipeline cannot be read.
    pub async fn snapshot(&self, now: DateTime<Utc>) -> Result<PipelineSnapshot, RunError> {
        let rows = self
            .pipeline
            .read_rows()
            .await
            .map_err(at_stage("reading pipeline"))?;
        let table = PipelineTable::from_rows(&rows, self.offset);
        if !table.missing_columns.is_empty() {
            tracing::warn!(
                missing = ?table.missing_columns,
                "pipeline sheet is missing expected columns"
            );
        }
        let report = compute_metrics(&table.records, &self.policy, now);
        Ok(PipelineSnapshot {
            directory: table.email_directory(),
            missing_columns: table.missing_columns,
            report,
        })
    }

    async fn load_history(&self) -> Result<NudgeHistory, RunError> {
        self.history
            .load()
            .await
            .map_err(at_stage("loading nudge history"))
    }

    async fn prepare(
        &self,
        now: DateTime<Utc>,
        force: bool,
    ) -> Result<Option<PreparedRun>, RunError> {
        if !force && self.is_weekend(now) {
            tracing::info!(
                local_date = %now.with_timezone(&self.offset).date_naive(),
                "weekend, skipping nudge run"
            );
            return Ok(None);
        }

        let snapshot = self.snapshot(now).await?;
        let history = self.load_history().await?;
        let plan = self
            .gate
            .plan(&snapshot.report, &snapshot.directory, &history, now);

        for entry in &plan.entries {
            match entry.decision.skip_reason() {
                None => tracing::info!(recruiter = %entry.recruiter, "eligible for nudge"),
                Some(reason) => {
                    tracing::debug!(recruiter = %entry.recruiter, %reason, "not nudging");
                }
            }
        }

        Ok(Some(PreparedRun { snapshot, plan }))
    }

    fn summary_for(plan: &NudgePlan, dry_run: bool) -> RunSummary {
        let counts = plan.summary();
        RunSummary {
            recruiters: plan.entries.len(),
            planned: counts.would_send,
            skipped: counts.skipped,
            dry_run,
            ..RunSummary::default()
        }
    }

    /// Plan the day's nudges without generating or sending anything.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Collaborator`] if the pipeline or history cannot be read.
    pub async fn dry_run(&self, now: DateTime<Utc>, force: bool) -> Result<RunOutcome, RunError> {
        let Some(prepared) = self.prepare(now, force).await? else {
            return Ok(RunOutcome::SkippedWeekend);
        };
        let summary = Self::summary_for(&prepared.plan, true);
        tracing::info!(
            recruiters = summary.recruiters,
            planned = summary.planned,
            "dry run complete, nothing sent"
        );
        Ok(RunOutcome::Completed(summary))
    }

    /// Run the daily batch.
    ///
    /// # Errors
    ///
    /// Aborts on the first failed read, render, send, or history write.
    /// Nudges already sent in this run stay sent and recorded.
    pub async fn run<T, N>(
        &self,
        generator: &T,
        sender: &N,
        now: DateTime<Utc>,
        force: bool,
    ) -> Result<RunOutcome, RunError>
    where
        T: TextGenerator + Sync,
        N: NotificationSender + Sync,
    {
        let Some(prepared) = self.prepare(now, force).await? else {
            return Ok(RunOutcome::SkippedWeekend);
        };
        let mut summary = Self::summary_for(&prepared.plan, false);

        for (recruiter, email) in prepared.plan.recipients() {
            let Some(metrics) = prepared.snapshot.report.get(recruiter) else {
                continue;
            };

            let prompt = build_nudge_prompt(recruiter, metrics, &self.policy, self.offset);
            let Some(message) = generator.generate(&prompt).await else {
                tracing::warn!(recruiter, "no message generated, skipping nudge");
                summary.generation_failures += 1;
                continue;
            };

            let outgoing = OutgoingEmail {
                to: email.to_string(),
                cc: self.policy.reviewer_email.clone(),
                subject: NUDGE_SUBJECT.to_string(),
                html_body: self.render(recruiter, metrics, &message)?,
            };
            sender
                .send(&outgoing)
                .await
                .map_err(at_stage("sending nudge"))?;
            self.history
                .record(recruiter, now)
                .await
                .map_err(at_stage("recording nudge"))?;

            summary.sent += 1;
            tracing::info!(recruiter, to = %outgoing.to, "nudge sent");
        }

        tracing::info!(
            recruiters = summary.recruiters,
            planned = summary.planned,
            sent = summary.sent,
            generation_failures = summary.generation_failures,
            "nudge run complete"
        );
        Ok(RunOutcome::Completed(summary))
    }

    fn render(
        &self,
        recruiter: &str,
        metrics: &RecruiterMetrics,
        message: &str,
    ) -> Result<String, RunError> {
        Ok(self
            .renderer
            .render(recruiter, metrics, message, &self.policy, self.offset)?)
    }

    /// Decisions and reasons for every recruiter, without side effects.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Collaborator`] if the pipeline or history cannot be read.
    pub async fn audit(&self, now: DateTime<Utc>) -> Result<AuditReport, RunError> {
        let snapshot = self.snapshot(now).await?;
        let history = self.load_history().await?;
        let plan = self
            .gate
            .plan(&snapshot.report, &snapshot.directory, &history, now);
        let summary = plan.summary();

        tracing::info!(
            recruiters = plan.entries.len(),
            would_send = summary.would_send,
            "audit complete"
        );

        Ok(AuditReport {
            generated_at: now,
            weekend: self.is_weekend(now),
            stats: snapshot.report.stats,
            missing_columns: snapshot.missing_columns,
            plan,
            summary,
        })
    }

    /// Generate a nudge for one recruiter regardless of the gate and send it
    /// to the reviewer only. The nudge history is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::NoReviewer`] without a reviewer address,
    /// [`RunError::UnknownRecruiter`] if the recruiter has no metrics,
    /// [`RunError::GenerationFailed`] if no message comes back, and
    /// collaborator errors from reading or sending.
    pub async fn preview<T, N>(
        &self,
        generator: &T,
        sender: &N,
        recruiter: &str,
        now: DateTime<Utc>,
    ) -> Result<OutgoingEmail, RunError>
    where
        T: TextGenerator + Sync,
        N: NotificationSender + Sync,
    {
        let reviewer = self.policy.reviewer_email.clone().ok_or(RunError::NoReviewer)?;
        let snapshot = self.snapshot(now).await?;
        let metrics = snapshot
            .report
            .get(recruiter)
            .ok_or_else(|| RunError::UnknownRecruiter(recruiter.to_string()))?;

        let prompt = build_nudge_prompt(recruiter, metrics, &self.policy, self.offset);
        let message = generator
            .generate(&prompt)
            .await
            .ok_or_else(|| RunError::GenerationFailed(recruiter.to_string()))?;

        let outgoing = OutgoingEmail {
            to: reviewer,
            cc: None,
            subject: preview_subject(recruiter),
            html_body: self.render(recruiter, metrics, &message)?,
        };
        sender
            .send(&outgoing)
            .await
            .map_err(at_stage("sending preview"))?;
        tracing::info!(recruiter, to = %outgoing.to, "preview nudge sent");
        Ok(outgoing)
    }
}

#[must_use]
pub fn preview_subject(recruiter: &str) -> String {
    format!("🔁 TEST: Nudge for {recruiter}")
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
