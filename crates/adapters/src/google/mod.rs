//! Google Calendar v3 and Gmail v1 over plain HTTP with a bearer token.
//!
//! Token acquisition and refresh happen outside this crate. The configured
//! access token is used as-is and a 401 surfaces as [`GoogleApiError::AuthExpired`].

pub mod calendar;
pub mod gmail;

use std::time::Duration;

use agenda_core::config::GoogleConfig;
use agenda_core::gateway::GatewayError;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::warn;

pub use calendar::GoogleCalendar;
pub use gmail::GmailMailer;

pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

#[derive(Debug, thiserror::Error)]
pub enum GoogleApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token expired or revoked")]
    AuthExpired,
    #[error("access token is not configured")]
    MissingToken,
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Configuration(String),
}

impl From<GoogleApiError> for GatewayError {
    fn from(error: GoogleApiError) -> Self {
        match error {
            GoogleApiError::AuthExpired | GoogleApiError::MissingToken => Self::Unauthorized,
            GoogleApiError::Http(error) => Self::Transport(error.to_string()),
            GoogleApiError::Api { status, message } => Self::Provider { status, message },
            GoogleApiError::Json(error) => Self::InvalidResponse(error.to_string()),
            GoogleApiError::Configuration(message) => Self::Configuration(message),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, initial_backoff_ms: 250, max_backoff_ms: 2_000 }
    }
}

impl RetryPolicy {
    /// A single attempt, for calls that must not be repeated.
    pub fn once() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    fn delay(&self, attempt: u32) -> Duration {
        let exponent = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(
            self.initial_backoff_ms.saturating_mul(exponent).min(self.max_backoff_ms),
        )
    }
}

fn is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

/// Authorized HTTP client shared by the calendar and mail adapters.
#[derive(Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    access_token: SecretString,
}

impl GoogleClient {
    pub fn new(access_token: SecretString, timeout: Duration) -> Result<Self, GoogleApiError> {
        if access_token.expose_secret().trim().is_empty() {
            return Err(GoogleApiError::MissingToken);
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, access_token })
    }

    pub fn from_config(config: &GoogleConfig) -> Result<Self, GoogleApiError> {
        let token = config.access_token.clone().ok_or(GoogleApiError::MissingToken)?;
        Self::new(token, Duration::from_secs(config.timeout_secs))
    }

    pub(crate) fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.http.get(url).bearer_auth(self.access_token.expose_secret())
    }

    pub(crate) fn post(&self, url: Url) -> reqwest::RequestBuilder {
        self.http.post(url).bearer_auth(self.access_token.expose_secret())
    }

    /// Sends `request` and decodes a successful JSON body. Retryable statuses
    /// and transport timeouts are retried per `policy`.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        policy: &RetryPolicy,
    ) -> Result<T, GoogleApiError> {
        let attempts = policy.max_attempts.max(1);
        let mut attempt = 1;
        let response = loop {
            let Some(cloned) = request.try_clone() else {
                break request.send().await?;
            };
            match cloned.send().await {
                Ok(response) if is_retryable(response.status()) && attempt < attempts => {
                    let delay = policy.delay(attempt);
                    warn!(
                        event_name = "adapters.google.retry",
                        attempt,
                        status = response.status().as_u16(),
                        delay_ms = delay.as_millis() as u64,
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => break response,
                Err(error) if (error.is_timeout() || error.is_connect()) && attempt < attempts => {
                    let delay = policy.delay(attempt);
                    warn!(
                        event_name = "adapters.google.retry",
                        attempt,
                        error = %error,
                        delay_ms = delay.as_millis() as u64,
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error.into()),
            }
            attempt += 1;
        };

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GoogleApiError::AuthExpired);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleApiError::Api { status: status.as_u16(), message: api_message(&body) });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Joins `segments` onto `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, GoogleApiError> {
    let mut url = Url::parse(base)
        .map_err(|error| GoogleApiError::Configuration(format!("invalid API base `{base}`: {error}")))?;
    url.path_segments_mut()
        .map_err(|()| GoogleApiError::Configuration(format!("API base `{base}` cannot take a path")))?
        .extend(segments);
    Ok(url)
}

/// Google wraps failures as `{"error": {"message": ...}}`. Falls back to the
/// raw body when it is not shaped that way.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use agenda_core::gateway::GatewayError;
    use secrecy::SecretString;

    use super::{api_message, endpoint, GoogleApiError, GoogleClient, RetryPolicy, CALENDAR_API_BASE};

    #[test]
    fn api_message_prefers_structured_error() {
        let body = r#"{"error": {"code": 403, "message": "Insufficient Permission"}}"#;
        assert_eq!(api_message(body), "Insufficient Permission");
        assert_eq!(api_message("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn endpoint_encodes_calendar_ids() {
        let url = endpoint(CALENDAR_API_BASE, &["calendars", "team#ops@group.calendar.google.com", "events"])
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team%23ops@group.calendar.google.com/events"
        );
    }

    #[test]
    fn retry_delay_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_millis(250));
        assert_eq!(policy.delay(2), Duration::from_millis(500));
        assert_eq!(policy.delay(10), Duration::from_millis(2_000));
        assert_eq!(RetryPolicy::once().max_attempts, 1);
    }

    #[test]
    fn blank_token_is_rejected() {
        let result = GoogleClient::new(SecretString::from("  ".to_string()), Duration::from_secs(5));
        assert!(matches!(result, Err(GoogleApiError::MissingToken)));
    }

    #[test]
    fn errors_map_to_gateway_errors() {
        assert_eq!(GatewayError::from(GoogleApiError::AuthExpired), GatewayError::Unauthorized);
        assert_eq!(
            GatewayError::from(GoogleApiError::Api { status: 404, message: "Not Found".to_string() }),
            GatewayError::Provider { status: 404, message: "Not Found".to_string() }
        );
    }
}
