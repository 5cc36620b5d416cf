use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ports::NudgeHistoryStore;

/// Snapshot of the nudge log: recruiter → last time a nudge was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NudgeHistory(BTreeMap<String, DateTime<Utc>>);

impl NudgeHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn last_sent(&self, recruiter: &str) -> Option<DateTime<Utc>> {
        self.0.get(recruiter).copied()
    }

    /// Overwrites any earlier entry for `recruiter`.
    pub fn record(&mut self, recruiter: impl Into<String>, sent_at: DateTime<Utc>) {
        self.0.insert(recruiter.into(), sent_at);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, DateTime<Utc>)> for NudgeHistory {
    fn from_iter<I: IntoIterator<Item = (S, DateTime<Utc>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// In-process history store, used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    inner: Mutex<NudgeHistory>,
}

impl MemoryHistoryStore {
    #[must_use]
    pub fn new(history: NudgeHistory) -> Self {
        Self {
            inner: Mutex::new(history),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> NudgeHistory {
        self.inner
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl NudgeHistoryStore for MemoryHistoryStore {
    type Error = Infallible;

    async fn load(&self) -> Result<NudgeHistory, Self::Error> {
        Ok(self.snapshot())
    }

    async fn record(&self, recruiter: &str, sent_at: DateTime<Utc>) -> Result<(), Self::Error> {
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.record(recruiter, sent_at);
        Ok(())
    }
}
