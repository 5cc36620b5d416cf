//! Builds the production collaborators from [`AppConfig`].

use anyhow::Context;
use arcoach_core::{load_policy_or_default, AppConfig, NudgeRunner};
use arcoach_llm::LlmClient;
use arcoach_mail::MailClient;
use arcoach_sheets::{SheetNudgeLog, SheetPipelineSource, SheetsClient};

pub(crate) type SheetRunner = NudgeRunner<SheetPipelineSource, SheetNudgeLog>;

/// Runner over the configured pipeline sheet and nudge log.
///
/// # Errors
///
/// Returns an error if the policy file is invalid or a client cannot be built.
pub(crate) fn sheet_runner(config: &AppConfig) -> anyhow::Result<SheetRunner> {
    let policy = load_policy_or_default(&config.policy_path)
        .with_context(|| format!("loading policy {}", config.policy_path.display()))?;

    let sheets = SheetsClient::with_base_url(
        &config.sheets_access_token,
        &config.spreadsheet_id,
        config.request_timeout_secs,
        &config.sheets_base_url,
    )?;
    let offset = config.local_offset();
    let pipeline = SheetPipelineSource::new(sheets.clone(), config.pipeline_sheet.clone());
    let history = SheetNudgeLog::new(sheets, config.nudge_log_sheet.clone(), offset);

    Ok(NudgeRunner::new(pipeline, history, policy, offset)?)
}

/// # Errors
///
/// Returns an error if `OPENAI_API_KEY` is unset or the client cannot be built.
pub(crate) fn llm_client(config: &AppConfig) -> anyhow::Result<LlmClient> {
    let api_key = config
        .openai_api_key
        .as_deref()
        .context("OPENAI_API_KEY is required for this command")?;
    Ok(LlmClient::with_base_url(
        api_key,
        &config.llm_model,
        config.llm_temperature,
        config.request_timeout_secs,
        &config.llm_base_url,
    )?)
}

/// # Errors
///
/// Returns an error if `SENDGRID_API_KEY` is unset or the client cannot be built.
pub(crate) fn mail_client(config: &AppConfig) -> anyhow::Result<MailClient> {
    let api_key = config
        .sendgrid_api_key
        .as_deref()
        .context("SENDGRID_API_KEY is required for this command")?;
    Ok(MailClient::with_base_url(
        api_key,
        &config.mail_from,
        config.request_timeout_secs,
        &config.mail_base_url,
    )?)
}
