//! Collaborator contracts for the daily run.
//!
//! The runner only talks to the outside world through these traits; the
//! Sheets, OpenAI, and SendGrid adapters live in their own crates.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::email::OutgoingEmail;
use crate::history::NudgeHistory;

/// Raw rows of the pipeline sheet, header row at index 1.
pub trait PipelineSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn read_rows(&self) -> impl Future<Output = Result<Vec<Vec<String>>, Self::Error>> + Send;
}

/// Per-recruiter "last nudged" timestamps, one entry per recruiter.
pub trait NudgeHistoryStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load(&self) -> impl Future<Output = Result<NudgeHistory, Self::Error>> + Send;

    /// Set `recruiter`'s last-sent time, replacing any earlier entry.
    fn record(
        &self,
        recruiter: &str,
        sent_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Single-attempt text generation. Failures are handled inside the
/// implementation and surface as `None`.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = Option<String>> + Send;
}

pub trait NotificationSender {
    type Error: std::error::Error + Send + Sync + 'static;

    fn send(&self, email: &OutgoingEmail) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
