use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub policy_path: PathBuf,
    pub spreadsheet_id: String,
    pub sheets_access_token: String,
    pub sheets_base_url: String,
    pub pipeline_sheet: String,
    pub nudge_log_sheet: String,
    pub openai_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub sendgrid_api_key: Option<String>,
    pub mail_base_url: String,
    pub mail_from: String,
    pub request_timeout_secs: u64,
    pub utc_offset_minutes: i32,
}

impl AppConfig {
    /// Local offset for naive sheet timestamps, weekend checks, and rendered dates.
    ///
    /// The offset is range-checked when the config is built, so UTC is only a
    /// fallback for hand-built configs.
    #[must_use]
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("policy_path", &self.policy_path)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("sheets_access_token", &"[redacted]")
            .field("sheets_base_url", &self.sheets_base_url)
            .field("pipeline_sheet", &self.pipeline_sheet)
            .field("nudge_log_sheet", &self.nudge_log_sheet)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_temperature", &self.llm_temperature)
            .field(
                "sendgrid_api_key",
                &self.sendgrid_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("mail_base_url", &self.mail_base_url)
            .field("mail_from", &self.mail_from)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("utc_offset_minutes", &self.utc_offset_minutes)
            .finish()
    }
}
