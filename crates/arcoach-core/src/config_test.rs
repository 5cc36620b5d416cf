use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("ARC_SPREADSHEET_ID", "sheet-123");
    m.insert("ARC_SHEETS_ACCESS_TOKEN", "ya29.token");
    m
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "ARC_ENV"));
}

#[test]
fn build_app_config_fails_without_spreadsheet_id() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "ARC_SPREADSHEET_ID"),
        "expected MissingEnvVar(ARC_SPREADSHEET_ID), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_token_as_missing() {
    let mut map = full_env();
    map.insert("ARC_SHEETS_ACCESS_TOKEN", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "ARC_SHEETS_ACCESS_TOKEN"),
        "expected MissingEnvVar(ARC_SHEETS_ACCESS_TOKEN), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_all_required_vars() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.policy_path, PathBuf::from("./config/policy.yaml"));
    assert_eq!(cfg.spreadsheet_id, "sheet-123");
    assert_eq!(cfg.sheets_base_url, "https://sheets.googleapis.com/");
    assert_eq!(cfg.pipeline_sheet, "Active+Rejected");
    assert_eq!(cfg.nudge_log_sheet, "Nudge_Log");
    assert!(cfg.openai_api_key.is_none());
    assert_eq!(cfg.llm_model, "gpt-4o");
    assert!((cfg.llm_temperature - 0.7).abs() < f32::EPSILON);
    assert!(cfg.sendgrid_api_key.is_none());
    assert_eq!(cfg.mail_from, "arc@localhost");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.utc_offset_minutes, 0);
}

#[test]
fn build_app_config_reads_optional_api_keys() {
    let mut map = full_env();
    map.insert("OPENAI_API_KEY", "sk-test");
    map.insert("SENDGRID_API_KEY", "SG.test");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.openai_api_key.as_deref(), Some("sk-test"));
    assert_eq!(cfg.sendgrid_api_key.as_deref(), Some("SG.test"));
}

#[test]
fn build_app_config_rejects_out_of_range_temperature() {
    let mut map = full_env();
    map.insert("ARC_LLM_TEMPERATURE", "3.5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ARC_LLM_TEMPERATURE"
        ),
        "expected InvalidEnvVar(ARC_LLM_TEMPERATURE), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_numeric_timeout() {
    let mut map = full_env();
    map.insert("ARC_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ARC_REQUEST_TIMEOUT_SECS"
        ),
        "expected InvalidEnvVar(ARC_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_utc_offset_override() {
    let mut map = full_env();
    map.insert("ARC_UTC_OFFSET_MINUTES", "330");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.utc_offset_minutes, 330);
    assert_eq!(cfg.local_offset().local_minus_utc(), 330 * 60);
}

#[test]
fn build_app_config_rejects_offset_beyond_a_day() {
    let mut map = full_env();
    map.insert("ARC_UTC_OFFSET_MINUTES", "1440");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ARC_UTC_OFFSET_MINUTES"
        ),
        "expected InvalidEnvVar(ARC_UTC_OFFSET_MINUTES), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = full_env();
    map.insert("OPENAI_API_KEY", "sk-secret-value");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("ya29.token"));
    assert!(!rendered.contains("sk-secret-value"));
    assert!(rendered.contains("[redacted]"));
}
