use thiserror::Error;

/// Errors returned by the Google Sheets client and its adapters.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL could not be parsed.
    #[error("invalid Sheets base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The range names a sheet (tab) that does not exist.
    #[error("sheet not found for range {0}")]
    SheetNotFound(String),

    /// Any other non-2xx response.
    #[error("Sheets API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
