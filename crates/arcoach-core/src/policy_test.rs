use std::path::Path;

use chrono::TimeZone;

use super::*;

#[test]
fn default_policy_matches_pipeline_conventions() {
    let policy = CoachPolicy::default();
    assert_eq!(policy.historical_start, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
    assert_eq!(policy.recent_window_days, 14);
    assert_eq!(policy.cooldown_days, 7);
    assert!((policy.goal_percent - 80.0).abs() < f64::EPSILON);
    assert_eq!(policy.eligible_stages.len(), 9);
    assert!(!policy
        .senior_title_keywords
        .iter()
        .any(|k| k == "DIRECTOR"));
}

#[test]
fn empty_yaml_yields_defaults() {
    let policy = parse_policy("{}").unwrap();
    assert_eq!(policy, CoachPolicy::default());
}

#[test]
fn partial_yaml_overrides_only_named_fields() {
    let yaml = r"
goal_percent: 75
excluded_recruiters:
  - '  Alex Example '
eligible_stages:
  - onsite interview
";
    let policy = parse_policy(yaml).unwrap();
    assert!((policy.goal_percent - 75.0).abs() < f64::EPSILON);
    assert_eq!(policy.excluded_recruiters, vec!["Alex Example".to_string()]);
    assert_eq!(policy.eligible_stages, vec!["ONSITE INTERVIEW".to_string()]);
    assert_eq!(policy.cooldown_days, 7);
}

#[test]
fn zero_recent_window_is_rejected() {
    let err = parse_policy("recent_window_days: 0").unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("recent_window_days")));
}

#[test]
fn oversized_windows_are_rejected() {
    let err = parse_policy("recent_window_days: 100000000").unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("recent_window_days")));

    let err = parse_policy("cooldown_days: 3651").unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("cooldown_days")));

    let policy = parse_policy("recent_window_days: 3650\ncooldown_days: 3650").unwrap();
    assert_eq!(policy.recent_window_days, MAX_WINDOW_DAYS);
}

#[test]
fn cutoffs_clamp_instead_of_overflowing() {
    let policy = CoachPolicy {
        recent_window_days: u32::MAX,
        cooldown_days: u32::MAX,
        ..CoachPolicy::default()
    };
    let now = Utc.with_ymd_and_hms(2025, 9, 15, 13, 30, 0).unwrap();
    assert_eq!(policy.recent_cutoff(now), DateTime::<Utc>::MIN_UTC);
    assert_eq!(policy.cooldown_cutoff(now), DateTime::<Utc>::MIN_UTC);

    let records = [crate::testing::record("Jane Doe").build()];
    let report = crate::metrics::compute_metrics(&records, &policy, crate::testing::now());
    let jane = report.get("Jane Doe").unwrap();
    assert_eq!(jane.recent.eligible, 1);
    assert_eq!(jane.skipped_candidates.len(), 1);
}

#[test]
fn goal_above_hundred_is_rejected() {
    let err = parse_policy("goal_percent: 120").unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("goal_percent")));
}

#[test]
fn duplicate_excluded_recruiter_is_rejected() {
    let yaml = "excluded_recruiters: ['Sam Smith', 'Sam Smith ']";
    let err = parse_policy(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate")));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = parse_policy("goal_percent: [").unwrap_err();
    assert!(matches!(err, ConfigError::PolicyFileParse(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_policy(Path::new("/nonexistent/policy.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::PolicyFileIo { .. }));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let policy = load_policy_or_default(Path::new("/nonexistent/policy.yaml")).unwrap();
    assert_eq!(policy, CoachPolicy::default());
}

#[test]
fn shipped_policy_file_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("policy.yaml");
    let policy = load_policy(&path).expect("config/policy.yaml should load");
    assert_eq!(policy.recent_window_days, 14);
    assert_eq!(policy.max_listed_candidates, 5);
    assert!(policy.excluded_recruiters.is_empty());
}

#[test]
fn shipped_roster_example_parses_once_uncommented() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("policy.yaml");
    let content = std::fs::read_to_string(path).unwrap();
    let example: String = content
        .lines()
        .skip_while(|line| !line.starts_with("# excluded_recruiters:"))
        .map_while(|line| line.strip_prefix("# "))
        .map(|line| format!("{line}\n"))
        .collect();

    let policy = parse_policy(&example).unwrap();
    assert_eq!(
        policy.excluded_recruiters,
        vec!["Alex Example".to_string(), "Sam Example".to_string()]
    );
}

#[test]
fn senior_title_match_is_case_insensitive_substring() {
    let policy = CoachPolicy::default();
    assert!(policy.is_senior_title("VP of Engineering"));
    assert!(policy.is_senior_title("Chief of Staff"));
    assert!(policy.is_senior_title("svp, sales"));
    assert!(!policy.is_senior_title("Software Engineer"));
    assert!(!policy.is_senior_title("Director of Product"));
    assert!(!policy.is_senior_title(""));
}

#[test]
fn cutoffs_are_exact_day_multiples_before_now() {
    let policy = CoachPolicy::default();
    let now = Utc.with_ymd_and_hms(2025, 9, 15, 13, 30, 0).unwrap();
    assert_eq!(
        policy.recent_cutoff(now),
        Utc.with_ymd_and_hms(2025, 9, 1, 13, 30, 0).unwrap()
    );
    assert_eq!(
        policy.cooldown_cutoff(now),
        Utc.with_ymd_and_hms(2025, 9, 8, 13, 30, 0).unwrap()
    );
}

#[test]
fn historical_start_is_utc_midnight() {
    let policy = CoachPolicy::default();
    assert_eq!(
        policy.historical_start_at(),
        Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap()
    );
}
