use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const MAX_UTC_OFFSET_MINUTES: i32 = 23 * 60 + 59;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_i32 = |var: &str, default: &str| -> Result<i32, ConfigError> {
        or_default(var, default)
            .parse::<i32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f32 = |var: &str, default: &str| -> Result<f32, ConfigError> {
        or_default(var, default)
            .parse::<f32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("ARC_ENV", "development"))?;
    let log_level = or_default("ARC_LOG_LEVEL", "info");
    let policy_path = PathBuf::from(or_default("ARC_POLICY_PATH", "./config/policy.yaml"));

    let spreadsheet_id = require("ARC_SPREADSHEET_ID")?;
    let sheets_access_token = require("ARC_SHEETS_ACCESS_TOKEN")?;
    let sheets_base_url = or_default("ARC_SHEETS_BASE_URL", "https://sheets.googleapis.com/");
    let pipeline_sheet = or_default("ARC_PIPELINE_SHEET", "Active+Rejected");
    let nudge_log_sheet = or_default("ARC_NUDGE_LOG_SHEET", "Nudge_Log");

    let openai_api_key = lookup("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
    let llm_base_url = or_default("ARC_LLM_BASE_URL", "https://api.openai.com/v1/");
    let llm_model = or_default("ARC_LLM_MODEL", "gpt-4o");
    let llm_temperature = parse_f32("ARC_LLM_TEMPERATURE", "0.7")?;
    if !(0.0..=2.0).contains(&llm_temperature) {
        return Err(invalid(
            "ARC_LLM_TEMPERATURE",
            format!("{llm_temperature} is outside 0.0..=2.0"),
        ));
    }

    let sendgrid_api_key = lookup("SENDGRID_API_KEY").ok().filter(|k| !k.is_empty());
    let mail_base_url = or_default("ARC_MAIL_BASE_URL", "https://api.sendgrid.com/");
    let mail_from = or_default("ARC_MAIL_FROM", "arc@localhost");

    let request_timeout_secs = parse_u64("ARC_REQUEST_TIMEOUT_SECS", "30")?;
    let utc_offset_minutes = parse_i32("ARC_UTC_OFFSET_MINUTES", "0")?;
    if utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return Err(invalid(
            "ARC_UTC_OFFSET_MINUTES",
            format!("{utc_offset_minutes} is outside ±{MAX_UTC_OFFSET_MINUTES}"),
        ));
    }

    Ok(AppConfig {
        env,
        log_level,
        policy_path,
        spreadsheet_id,
        sheets_access_token,
        sheets_base_url,
        pipeline_sheet,
        nudge_log_sheet,
        openai_api_key,
        llm_base_url,
        llm_model,
        llm_temperature,
        sendgrid_api_key,
        mail_base_url,
        mail_from,
        request_timeout_secs,
        utc_offset_minutes,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ARC_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
