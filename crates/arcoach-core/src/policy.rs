use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Stage labels that make a candidate eligible for an AI interview.
pub const DEFAULT_ELIGIBLE_STAGES: [&str; 9] = [
    "HIRING MANAGER SCREEN",
    "ASSESSMENT",
    "ONSITE INTERVIEW",
    "FINAL INTERVIEW",
    "OFFER APPROVALS",
    "OFFER EXTENDED",
    "OFFER DECLINED",
    "PENDING START",
    "HIRED",
];

/// Title fragments that mark a senior role handled outside AI screening.
pub const DEFAULT_SENIOR_TITLE_KEYWORDS: [&str; 5] =
    ["VP", "VICE-PRESIDENT", "CHIEF", "C-LEVEL", "EXECUTIVE"];

/// Upper bound for day windows. Keeps `now - window` inside chrono's range.
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Coaching policy: the windows, thresholds, and rosters that drive metrics
/// and nudge eligibility.
///
/// Every field has a default, so a policy file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachPolicy {
    /// Rows applied before this date (UTC midnight) are ignored entirely.
    pub historical_start: NaiveDate,
    pub recent_window_days: u32,
    pub cooldown_days: u32,
    /// Adoption goal; recruiters at or above it are not nudged.
    pub goal_percent: f64,
    /// Missed candidates listed in the prompt and email.
    pub max_listed_candidates: usize,
    pub eligible_stages: Vec<String>,
    pub senior_title_keywords: Vec<String>,
    /// Recruiters permanently opted out of nudges.
    pub excluded_recruiters: Vec<String>,
    /// Copied on every nudge and the recipient of previews.
    pub reviewer_email: Option<String>,
    /// Closing line the generated message must end with.
    pub sign_off: String,
}

impl Default for CoachPolicy {
    fn default() -> Self {
        Self {
            historical_start: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap_or_default(),
            recent_window_days: 14,
            cooldown_days: 7,
            goal_percent: 80.0,
            max_listed_candidates: 5,
            eligible_stages: DEFAULT_ELIGIBLE_STAGES.map(String::from).to_vec(),
            senior_title_keywords: DEFAULT_SENIOR_TITLE_KEYWORDS.map(String::from).to_vec(),
            excluded_recruiters: Vec::new(),
            reviewer_email: None,
            sign_off: "Best, ARC".to_string(),
        }
    }
}

/// `now - window`, clamped to the earliest representable instant.
pub(crate) fn saturating_sub(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl CoachPolicy {
    #[must_use]
    pub fn historical_start_at(&self) -> DateTime<Utc> {
        self.historical_start.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// Start of the recent window: exactly `recent_window_days × 24h` before `now`.
    #[must_use]
    pub fn recent_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        saturating_sub(now, Duration::days(i64::from(self.recent_window_days)))
    }

    /// A nudge sent at or after this instant still blocks a new one.
    #[must_use]
    pub fn cooldown_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        saturating_sub(now, Duration::days(i64::from(self.cooldown_days)))
    }

    /// `stage` must already be trimmed and uppercased.
    #[must_use]
    pub fn is_eligible_stage(&self, stage: &str) -> bool {
        self.eligible_stages.iter().any(|s| s == stage)
    }

    #[must_use]
    pub fn is_senior_title(&self, title: &str) -> bool {
        if title.is_empty() {
            return false;
        }
        let upper = title.to_uppercase();
        self.senior_title_keywords
            .iter()
            .any(|keyword| upper.contains(keyword.as_str()))
    }

    #[must_use]
    pub fn is_excluded(&self, recruiter: &str) -> bool {
        self.excluded_recruiters.iter().any(|r| r == recruiter)
    }

    /// Uppercase and trim the stage and keyword lists so row values can be
    /// compared after the same normalization.
    fn normalize(&mut self) {
        for stage in &mut self.eligible_stages {
            *stage = stage.trim().to_uppercase();
        }
        for keyword in &mut self.senior_title_keywords {
            *keyword = keyword.trim().to_uppercase();
        }
        for name in &mut self.excluded_recruiters {
            *name = name.trim().to_string();
        }
    }
}

/// Load, normalize, and validate a coaching policy from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_policy(path: &Path) -> Result<CoachPolicy, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PolicyFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_policy(&content)
}

/// Like [`load_policy`], but a missing file yields the default policy.
///
/// # Errors
///
/// Returns `ConfigError` if an existing file cannot be read, parsed, or
/// fails validation.
pub fn load_policy_or_default(path: &Path) -> Result<CoachPolicy, ConfigError> {
    match load_policy(path) {
        Err(ConfigError::PolicyFileIo { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            tracing::warn!(
                path = %path.display(),
                "policy file not found, using default coaching policy"
            );
            Ok(CoachPolicy::default())
        }
        other => other,
    }
}

/// Parse, normalize, and validate a coaching policy from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_policy(content: &str) -> Result<CoachPolicy, ConfigError> {
    let mut policy: CoachPolicy = serde_yaml::from_str(content)?;
    policy.normalize();
    validate_policy(&policy)?;
    Ok(policy)
}

fn validate_policy(policy: &CoachPolicy) -> Result<(), ConfigError> {
    for (field, days) in [
        ("recent_window_days", policy.recent_window_days),
        ("cooldown_days", policy.cooldown_days),
    ] {
        if !(1..=MAX_WINDOW_DAYS).contains(&days) {
            return Err(ConfigError::Validation(format!(
                "{field} {days} must be between 1 and {MAX_WINDOW_DAYS}"
            )));
        }
    }

    if !(policy.goal_percent > 0.0 && policy.goal_percent <= 100.0) {
        return Err(ConfigError::Validation(format!(
            "goal_percent {} must be in (0, 100]",
            policy.goal_percent
        )));
    }

    if policy.max_listed_candidates == 0 {
        return Err(ConfigError::Validation(
            "max_listed_candidates must be at least 1".to_string(),
        ));
    }

    if policy.eligible_stages.iter().all(String::is_empty) {
        return Err(ConfigError::Validation(
            "eligible_stages must list at least one stage".to_string(),
        ));
    }

    if policy.senior_title_keywords.iter().any(String::is_empty) {
        return Err(ConfigError::Validation(
            "senior_title_keywords must not contain blank entries".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for name in &policy.excluded_recruiters {
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "excluded_recruiters must not contain blank names".to_string(),
            ));
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate excluded recruiter: '{name}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod tests;
