//! Pipeline source and nudge log adapters against a mocked Sheets API.

use arcoach_core::{NudgeHistoryStore, PipelineSource};
use arcoach_sheets::{SheetNudgeLog, SheetPipelineSource, SheetsClient};
use chrono::{FixedOffset, TimeZone, Utc};
use wiremock::matchers::{body_partial_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> SheetsClient {
    SheetsClient::with_base_url("test-token", "sheet-123", 30, base_url)
        .expect("client construction should not fail")
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn values(rows: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "majorDimension": "ROWS",
        "values": rows
    }))
}

#[tokio::test]
async fn pipeline_source_reads_configured_sheet() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/values/.*Active\+Rejected"))
        .respond_with(values(serde_json::json!([
            ["title"],
            ["Recruiter name"],
            ["Jane Doe"]
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let source = SheetPipelineSource::new(test_client(&server.uri()), "Active+Rejected");
    let rows = source.read_rows().await.expect("should read rows");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2], vec!["Jane Doe"]);
}

#[tokio::test]
async fn load_parses_existing_log() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/values/.*Nudge_Log"))
        .respond_with(values(serde_json::json!([
            ["Recruiter Name", "Last Nudge Sent"],
            ["Jane Doe", "2025-08-12T13:00:00Z"],
            ["Sam Roe", "2025-09-01T08:00:00Z"]
        ])))
        .mount(&server)
        .await;

    let log = SheetNudgeLog::new(test_client(&server.uri()), "Nudge_Log", utc());
    let history = log.load().await.expect("should load history");
    assert_eq!(history.len(), 2);
    assert_eq!(
        history.last_sent("Jane Doe"),
        Some(Utc.with_ymd_and_hms(2025, 8, 12, 13, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn load_creates_missing_log_sheet_with_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/values/.*Nudge_Log"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 400, "message": "Unable to parse range: 'Nudge_Log'" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/sheet-123:batchUpdate"))
        .and(body_partial_json(serde_json::json!({
            "requests": [{ "addSheet": { "properties": { "title": "Nudge_Log", "hidden": true } } }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path_regex(r"Nudge_Log.*A1:B1$"))
        .and(body_partial_json(serde_json::json!({
            "values": [["Recruiter Name", "Last Nudge Sent"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let log = SheetNudgeLog::new(test_client(&server.uri()), "Nudge_Log", utc());
    let history = log.load().await.expect("should create and load");
    assert!(history.is_empty());
}

#[tokio::test]
async fn record_overwrites_existing_row_in_place() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(values(serde_json::json!([
            ["Recruiter Name", "Last Nudge Sent"],
            ["Sam Roe", "2025-08-01T08:00:00Z"],
            ["Jane Doe", "2025-08-12T13:00:00Z"]
        ])))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path_regex(r"Nudge_Log.*!B3$"))
        .and(body_partial_json(serde_json::json!({
            "values": [["2025-09-17T13:00:00Z"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let log = SheetNudgeLog::new(test_client(&server.uri()), "Nudge_Log", utc());
    let sent_at = Utc.with_ymd_and_hms(2025, 9, 17, 13, 0, 0).unwrap();
    log.record("Jane Doe", sent_at).await.expect("record should succeed");
}

#[tokio::test]
async fn record_appends_new_recruiter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(values(serde_json::json!([
            ["Recruiter Name", "Last Nudge Sent"],
            ["Sam Roe", "2025-08-01T08:00:00Z"]
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"Nudge_Log.*A:B:append$"))
        .and(body_partial_json(serde_json::json!({
            "values": [["Jane Doe", "2025-09-17T13:00:00Z"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let log = SheetNudgeLog::new(test_client(&server.uri()), "Nudge_Log", utc());
    let sent_at = Utc.with_ymd_and_hms(2025, 9, 17, 13, 0, 0).unwrap();
    log.record("Jane Doe", sent_at).await.expect("record should succeed");
}
