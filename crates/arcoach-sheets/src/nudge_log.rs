//! Nudge history kept in a two-column sheet: `Recruiter Name`, `Last Nudge Sent`.
//!
//! The sheet is created hidden, with its header row, the first time it is
//! read or written. Each recruiter has at most one row; a new send overwrites
//! the timestamp in place.

use arcoach_core::{parse_timestamp, NudgeHistory, NudgeHistoryStore};
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

use crate::client::{a1_range, quote_sheet_name, SheetsClient};
use crate::error::SheetsError;

pub const HEADER_RECRUITER: &str = "Recruiter Name";
pub const HEADER_LAST_SENT: &str = "Last Nudge Sent";

#[derive(Debug, Clone)]
pub struct SheetNudgeLog {
    client: SheetsClient,
    sheet: String,
    /// Offset for timestamps written by hand without a zone.
    local_offset: FixedOffset,
}

impl SheetNudgeLog {
    #[must_use]
    pub fn new(client: SheetsClient, sheet: impl Into<String>, local_offset: FixedOffset) -> Self {
        Self {
            client,
            sheet: sheet.into(),
            local_offset,
        }
    }

    fn header_row() -> Vec<String> {
        vec![HEADER_RECRUITER.to_string(), HEADER_LAST_SENT.to_string()]
    }

    async fn create(&self) -> Result<(), SheetsError> {
        self.client.add_sheet(&self.sheet, true).await?;
        self.client
            .update_values(&a1_range(&self.sheet, "A1:B1"), &[Self::header_row()])
            .await
    }

    /// All rows of the log, creating the sheet if it does not exist yet.
    async fn rows(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        match self.client.get_values(&quote_sheet_name(&self.sheet)).await {
            Ok(rows) => Ok(rows),
            Err(SheetsError::SheetNotFound(_)) => {
                tracing::info!(sheet = %self.sheet, "nudge log sheet missing, creating it");
                self.create().await?;
                Ok(vec![Self::header_row()])
            }
            Err(e) => Err(e),
        }
    }

    fn parse_history(&self, rows: &[Vec<String>]) -> NudgeHistory {
        let mut history = NudgeHistory::new();
        for (index, row) in rows.iter().enumerate().skip(1) {
            let name = row.first().map_or("", |s| s.trim());
            let raw = row.get(1).map_or("", |s| s.trim());
            if name.is_empty() || raw.is_empty() {
                continue;
            }
            match parse_timestamp(raw, self.local_offset) {
                Some(at) => history.record(name, at),
                None => tracing::warn!(
                    sheet = %self.sheet,
                    row = index + 1,
                    value = raw,
                    "unreadable nudge timestamp, ignoring row"
                ),
            }
        }
        history
    }
}

/// Sheet row number (1-based) holding `recruiter`, skipping the header.
fn find_row(rows: &[Vec<String>], recruiter: &str) -> Option<usize> {
    rows.iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| row.first().is_some_and(|name| name.trim() == recruiter))
        .map(|(index, _)| index + 1)
}

impl NudgeHistoryStore for SheetNudgeLog {
    type Error = SheetsError;

    async fn load(&self) -> Result<NudgeHistory, SheetsError> {
        let rows = self.rows().await?;
        let history = self.parse_history(&rows);
        tracing::debug!(sheet = %self.sheet, entries = history.len(), "loaded nudge history");
        Ok(history)
    }

    async fn record(&self, recruiter: &str, sent_at: DateTime<Utc>) -> Result<(), SheetsError> {
        let timestamp = sent_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        let rows = self.rows().await?;

        if let Some(row) = find_row(&rows, recruiter) {
            self.client
                .update_values(&a1_range(&self.sheet, &format!("B{row}")), &[vec![timestamp]])
                .await
        } else {
            self.client
                .append_values(
                    &a1_range(&self.sheet, "A:B"),
                    &[vec![recruiter.to_string(), timestamp]],
                )
                .await
        }
    }
}
