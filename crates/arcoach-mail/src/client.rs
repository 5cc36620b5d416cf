//! HTTP client for the SendGrid v3 `mail/send` endpoint.

use std::time::Duration;

use arcoach_core::{NotificationSender, OutgoingEmail};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::MailError;

const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com/";

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    #[serde(default)]
    message: String,
}

/// Builds the send payload. The cc is dropped when it repeats the recipient,
/// since the API rejects duplicate addresses within one personalization.
fn send_request<'a>(from: &'a str, email: &'a OutgoingEmail) -> SendRequest<'a> {
    let cc = email
        .cc
        .as_deref()
        .map(str::trim)
        .filter(|cc| !cc.is_empty() && !cc.eq_ignore_ascii_case(email.to.trim()))
        .map(|cc| vec![Address { email: cc }])
        .unwrap_or_default();

    SendRequest {
        personalizations: [Personalization {
            to: vec![Address {
                email: email.to.trim(),
            }],
            cc,
        }],
        from: Address { email: from },
        subject: &email.subject,
        content: [Content {
            kind: "text/html",
            value: &email.html_body,
        }],
    }
}

/// Client for the mail-send API.
///
/// Use [`MailClient::new`] for production or [`MailClient::with_base_url`] to
/// point at a mock server in tests.
pub struct MailClient {
    client: Client,
    api_key: String,
    from: String,
    endpoint: Url,
}

impl MailClient {
    /// Creates a client pointed at the production SendGrid API.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_key: &str, from: &str, timeout_secs: u64) -> Result<Self, MailError> {
        Self::with_base_url(api_key, from, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`MailError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        from: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("arcoach/0.1 (recruiter-coach)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join("v3/mail/send"))
            .map_err(|e| MailError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            from: from.to_owned(),
            endpoint,
        })
    }

    /// Sends one HTML email. Any 2xx status counts as accepted.
    ///
    /// # Errors
    ///
    /// - [`MailError::Http`] on network failure.
    /// - [`MailError::Api`] on a non-2xx status.
    pub async fn send_email(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&send_request(&self.from, email))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(to = %email.to, subject = %email.subject, "mail accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .filter(|envelope| !envelope.errors.is_empty())
            .map_or(body, |envelope| {
                envelope
                    .errors
                    .into_iter()
                    .map(|item| item.message)
                    .collect::<Vec<_>>()
                    .join("; ")
            });
        Err(MailError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl NotificationSender for MailClient {
    type Error = MailError;

    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.send_email(email).await
    }
}
