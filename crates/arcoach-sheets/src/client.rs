//! HTTP client for the Google Sheets v4 values API.
//!
//! Covers the handful of calls ARC needs: read a range, overwrite a range,
//! append rows, and add a sheet. Cell values are always read as the sheet
//! formats them and written `RAW`.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::SheetsError;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/";

/// Google reports an unknown tab in a range with this message on a 400.
const UNKNOWN_SHEET_MESSAGE: &str = "Unable to parse range";

/// Quote a sheet name for use in an A1 range: `Nudge_Log` → `'Nudge_Log'`.
#[must_use]
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// A1 range on `sheet`, e.g. `a1_range("Nudge_Log", "B4")` → `'Nudge_Log'!B4`.
#[must_use]
pub fn a1_range(sheet: &str, cells: &str) -> String {
    format!("{}!{cells}", quote_sheet_name(sheet))
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Client for one spreadsheet.
///
/// Use [`SheetsClient::new`] for production or [`SheetsClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    access_token: String,
    spreadsheet_id: String,
    base_url: Url,
}

impl SheetsClient {
    /// Creates a client pointed at the production Sheets API.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        access_token: &str,
        spreadsheet_id: &str,
        timeout_secs: u64,
    ) -> Result<Self, SheetsError> {
        Self::with_base_url(access_token, spreadsheet_id, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`SheetsError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        access_token: &str,
        spreadsheet_id: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("arcoach/0.1 (recruiter-coach)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| SheetsError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(SheetsError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            });
        }

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            spreadsheet_id: spreadsheet_id.to_owned(),
            base_url: parsed,
        })
    }

    /// Reads `range` as a grid of formatted strings. Trailing empty cells and
    /// rows are omitted by the API, so rows may be ragged.
    ///
    /// # Errors
    ///
    /// - [`SheetsError::SheetNotFound`] if the range names a missing sheet.
    /// - [`SheetsError::Http`] / [`SheetsError::Api`] on transport or API failure.
    /// - [`SheetsError::Deserialize`] if the body is not a value range.
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(range);
        let response = self.send(self.request(Method::GET, url), range).await?;
        let body: ValueRange = Self::decode(response, range).await?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// Overwrites `range` with `values`.
    ///
    /// # Errors
    ///
    /// Same as [`SheetsClient::get_values`].
    pub async fn update_values(
        &self,
        range: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetsError> {
        let mut url = self.values_url(range);
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = ValueRangeBody {
            range,
            major_dimension: "ROWS",
            values,
        };
        self.send(self.request(Method::PUT, url).json(&body), range)
            .await?;
        Ok(())
    }

    /// Appends `values` as new rows after the table found in `range`.
    ///
    /// # Errors
    ///
    /// Same as [`SheetsClient::get_values`].
    pub async fn append_values(
        &self,
        range: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetsError> {
        let mut url = self.spreadsheet_url(&["values", &format!("{range}:append")]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        let body = ValueRangeBody {
            range,
            major_dimension: "ROWS",
            values,
        };
        self.send(self.request(Method::POST, url).json(&body), range)
            .await?;
        Ok(())
    }

    /// Adds a sheet (tab) named `title`.
    ///
    /// # Errors
    ///
    /// [`SheetsError::Http`] / [`SheetsError::Api`] on failure, including when
    /// a sheet with that title already exists.
    pub async fn add_sheet(&self, title: &str, hidden: bool) -> Result<(), SheetsError> {
        let url = self.spreadsheet_url_with_suffix(":batchUpdate");
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": { "title": title, "hidden": hidden }
                }
            }]
        });
        self.send(self.request(Method::POST, url).json(&body), title)
            .await?;
        tracing::info!(sheet = title, hidden, "added sheet");
        Ok(())
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.access_token)
    }

    /// `{base}v4/spreadsheets/{id}{suffix}`.
    fn spreadsheet_url_with_suffix(&self, suffix: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v4", "spreadsheets"])
                .push(&format!("{}{suffix}", self.spreadsheet_id));
        }
        url
    }

    /// `{base}v4/spreadsheets/{id}/{extra...}`, each segment percent-encoded.
    fn spreadsheet_url(&self, extra: &[&str]) -> Url {
        let mut url = self.spreadsheet_url_with_suffix("");
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(extra);
        }
        url
    }

    fn values_url(&self, range: &str) -> Url {
        self.spreadsheet_url(&["values", range])
    }

    /// Sends the request and maps non-2xx responses to [`SheetsError`].
    async fn send(&self, request: RequestBuilder, range: &str) -> Result<Response, SheetsError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
            .map(|envelope| envelope.error.message)
            .unwrap_or(text);

        if status == StatusCode::BAD_REQUEST && message.contains(UNKNOWN_SHEET_MESSAGE) {
            return Err(SheetsError::SheetNotFound(range.to_string()));
        }
        Err(SheetsError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: Response,
        context: &str,
    ) -> Result<T, SheetsError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SheetsError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
