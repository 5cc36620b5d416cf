//! Builders shared by the unit tests in this crate.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::records::PipelineRecord;

/// Fixed "now" for tests: a Wednesday, 13:00 UTC.
pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 17, 13, 0, 0).unwrap()
}

pub(crate) fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub(crate) struct RecordBuilder {
    record: PipelineRecord,
}

impl RecordBuilder {
    pub(crate) fn new(recruiter: &str) -> Self {
        Self {
            record: PipelineRecord {
                row_number: 3,
                recruiter: recruiter.to_string(),
                recruiter_email: String::new(),
                candidate_name: "Candidate".to_string(),
                title: "Software Engineer".to_string(),
                stage: "ONSITE INTERVIEW".to_string(),
                ai_interview: "N".to_string(),
                application_ts: String::new(),
                applied_at: Some(days_ago(3)),
                source: "LinkedIn".to_string(),
                company: "Acme".to_string(),
            },
        }
    }

    pub(crate) fn candidate(mut self, name: &str) -> Self {
        self.record.candidate_name = name.to_string();
        self
    }

    pub(crate) fn title(mut self, title: &str) -> Self {
        self.record.title = title.to_string();
        self
    }

    pub(crate) fn stage(mut self, stage: &str) -> Self {
        self.record.stage = stage.to_string();
        self
    }

    pub(crate) fn ai(mut self, flag: &str) -> Self {
        self.record.ai_interview = flag.to_string();
        self
    }

    pub(crate) fn applied(mut self, at: DateTime<Utc>) -> Self {
        self.record.applied_at = Some(at);
        self.record.application_ts = at.to_rfc3339();
        self
    }

    pub(crate) fn no_timestamp(mut self) -> Self {
        self.record.applied_at = None;
        self.record.application_ts = "not a date".to_string();
        self
    }

    pub(crate) fn email(mut self, email: &str) -> Self {
        self.record.recruiter_email = email.to_string();
        self
    }

    pub(crate) fn build(self) -> PipelineRecord {
        self.record
    }
}

pub(crate) fn record(recruiter: &str) -> RecordBuilder {
    RecordBuilder::new(recruiter)
}
