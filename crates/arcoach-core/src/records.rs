//! Pipeline sheet rows and the per-recruiter email directory.
//!
//! The pipeline sheet carries a title row, then a header row (index 1), then
//! data from index 2 on. Columns are located by header name; a missing header
//! reads as an empty cell for every row.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

pub const COL_RECRUITER_NAME: &str = "Recruiter name";
pub const COL_RECRUITER_EMAIL: &str = "Recruiter email";
pub const COL_LAST_STAGE: &str = "Last_stage";
pub const COL_AI_INTERVIEW: &str = "Ai_interview";
pub const COL_APPLICATION_TS: &str = "Application_ts";
pub const COL_NAME: &str = "Name";
pub const COL_TITLE: &str = "Title";
pub const COL_CURRENT_COMPANY: &str = "Current_company";
pub const COL_SOURCE_NAME: &str = "Source_name";

const HEADER_ROW_INDEX: usize = 1;
const FIRST_DATA_ROW_INDEX: usize = 2;

/// Returns `true` for recruiter/email cells that carry no real value.
#[must_use]
pub fn is_placeholder(value: &str) -> bool {
    matches!(value.trim(), "" | "N/A" | "undefined")
}

/// One candidate-application row from the pipeline sheet.
///
/// Cells are kept as the sheet rendered them (empty string when absent);
/// normalization happens where each field is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRecord {
    /// 1-based sheet row, for log messages.
    pub row_number: usize,
    pub recruiter: String,
    pub recruiter_email: String,
    pub candidate_name: String,
    pub title: String,
    pub stage: String,
    pub ai_interview: String,
    pub application_ts: String,
    /// `application_ts` parsed to an instant; `None` when blank or unparseable.
    pub applied_at: Option<DateTime<Utc>>,
    pub source: String,
    pub company: String,
}

/// Parsed pipeline sheet.
#[derive(Debug, Clone, Default)]
pub struct PipelineTable {
    pub records: Vec<PipelineRecord>,
    /// Headers that were expected but not found.
    pub missing_columns: Vec<&'static str>,
}

impl PipelineTable {
    /// Build records from raw sheet rows.
    ///
    /// `local_offset` is applied to timestamps that carry no zone of their own.
    #[must_use]
    pub fn from_rows(rows: &[Vec<String>], local_offset: FixedOffset) -> Self {
        let Some(headers) = rows.get(HEADER_ROW_INDEX) else {
            return Self::default();
        };

        let col = |name: &str| headers.iter().position(|h| h.trim() == name);
        let columns = [
            COL_RECRUITER_NAME,
            COL_RECRUITER_EMAIL,
            COL_LAST_STAGE,
            COL_AI_INTERVIEW,
            COL_APPLICATION_TS,
            COL_NAME,
            COL_TITLE,
            COL_CURRENT_COMPANY,
            COL_SOURCE_NAME,
        ];
        let missing_columns = columns
            .iter()
            .copied()
            .filter(|name| col(name).is_none())
            .collect();

        let recruiter_idx = col(COL_RECRUITER_NAME);
        let email_idx = col(COL_RECRUITER_EMAIL);
        let stage_idx = col(COL_LAST_STAGE);
        let ai_idx = col(COL_AI_INTERVIEW);
        let ts_idx = col(COL_APPLICATION_TS);
        let name_idx = col(COL_NAME);
        let title_idx = col(COL_TITLE);
        let company_idx = col(COL_CURRENT_COMPANY);
        let source_idx = col(COL_SOURCE_NAME);

        let records = rows
            .iter()
            .enumerate()
            .skip(FIRST_DATA_ROW_INDEX)
            .map(|(index, row)| {
                let cell = |idx: Option<usize>| -> String {
                    idx.and_then(|i| row.get(i)).cloned().unwrap_or_default()
                };
                let application_ts = cell(ts_idx);
                let applied_at = parse_timestamp(&application_ts, local_offset);
                PipelineRecord {
                    row_number: index + 1,
                    recruiter: cell(recruiter_idx),
                    recruiter_email: cell(email_idx),
                    candidate_name: cell(name_idx),
                    title: cell(title_idx),
                    stage: cell(stage_idx),
                    ai_interview: cell(ai_idx),
                    application_ts,
                    applied_at,
                    source: cell(source_idx),
                    company: cell(company_idx),
                }
            })
            .collect();

        Self {
            records,
            missing_columns,
        }
    }

    #[must_use]
    pub fn email_directory(&self) -> EmailDirectory {
        EmailDirectory::from_records(&self.records)
    }
}

/// Recruiter name → email address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmailDirectory(BTreeMap<String, String>);

impl EmailDirectory {
    /// Collect addresses from pipeline rows. Later rows win when a recruiter
    /// appears with different addresses.
    #[must_use]
    pub fn from_records(records: &[PipelineRecord]) -> Self {
        let mut map = BTreeMap::new();
        for record in records {
            let recruiter = record.recruiter.trim();
            let email = record.recruiter_email.trim();
            if recruiter.is_empty() || is_placeholder(email) {
                continue;
            }
            map.insert(recruiter.to_string(), email.to_string());
        }
        Self(map)
    }

    pub fn insert(&mut self, recruiter: impl Into<String>, email: impl Into<String>) {
        self.0.insert(recruiter.into(), email.into());
    }

    #[must_use]
    pub fn get(&self, recruiter: &str) -> Option<&str> {
        self.0.get(recruiter).map(String::as_str)
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

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EmailDirectory {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Naive date-time layouts the sheet is known to render, tried in order.
const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
];

/// Parse a sheet timestamp cell into an instant.
///
/// Accepts RFC 3339, ISO and US-style date-times, and bare dates. Values
/// without an explicit zone are read in `local_offset`, except ISO bare dates
/// (`2025-05-02`) which are UTC midnight. Returns `None` for blank or
/// unrecognized cells.
#[must_use]
pub fn parse_timestamp(raw: &str, local_offset: FixedOffset) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return local_offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
        return local_offset
            .from_local_datetime(&date.and_time(chrono::NaiveTime::MIN))
            .single()
            .map(|dt| dt.with_timezone(&Utc));
    }

    None
}
