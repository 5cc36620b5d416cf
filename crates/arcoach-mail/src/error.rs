use thiserror::Error;

/// Errors returned by the mail-send client.
#[derive(Debug, Error)]
pub enum MailError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid mail base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Non-2xx response, with the provider's error messages joined.
    #[error("mail API error ({status}): {message}")]
    Api { status: u16, message: String },
}
