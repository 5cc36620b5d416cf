//! Core logic for the Agentic Recruiter Coach (ARC).
//!
//! Turns recruiting-pipeline rows into per-recruiter AI-interview adoption
//! metrics, decides who gets a coaching nudge today, and drives the daily
//! batch over the collaborator traits in [`ports`]. Everything here is
//! independent of the spreadsheet, mail, and language-model backends so it
//! can be exercised against in-memory fakes.

pub mod app_config;
pub mod config;
pub mod email;
pub mod gate;
pub mod history;
pub mod metrics;
pub mod policy;
pub mod ports;
pub mod prompt;
pub mod records;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use email::{EmailError, EmailRenderer, OutgoingEmail, NUDGE_SUBJECT};
pub use gate::{Decision, NudgeGate, NudgePlan, PlanSummary, PlannedNudge, SkipReason};
pub use history::{MemoryHistoryStore, NudgeHistory};
pub use metrics::{
    compute_metrics, FilterStats, MetricsReport, RecruiterMetrics, SkippedCandidate, WindowCounts,
};
pub use policy::{load_policy, load_policy_or_default, CoachPolicy};
pub use ports::{NotificationSender, NudgeHistoryStore, PipelineSource, TextGenerator};
pub use prompt::build_nudge_prompt;
pub use records::{parse_timestamp, EmailDirectory, PipelineRecord, PipelineTable};
pub use runner::{
    preview_subject, AuditReport, NudgeRunner, PipelineSnapshot, RunError, RunOutcome, RunSummary,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read policy file {path}: {source}")]
    PolicyFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy file: {0}")]
    PolicyFileParse(#[from] serde_yaml::Error),

    #[error("policy validation failed: {0}")]
    Validation(String),
}
