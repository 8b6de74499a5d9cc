use agenda_core::config::EmailConfig;
use agenda_core::domain::booking::{EmailMessage, SentEmail, ToolResult};
use agenda_core::gateway::MailGateway;
use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{endpoint, GoogleApiError, GoogleClient, RetryPolicy, GMAIL_API_BASE};

#[derive(Debug, Serialize)]
struct SendBody {
    raw: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentMessage {
    id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxProfile {
    pub email_address: String,
    #[serde(default)]
    pub messages_total: Option<u64>,
}

/// Encodes a header value per RFC 2047 when it is not plain ASCII.
fn header_value(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value))
    }
}

/// Builds the RFC 2822 message Gmail expects in `raw`.
pub fn render_mime(sender: &str, message: &EmailMessage) -> String {
    format!(
        "From: {sender}\r\nTo: {to}\r\nSubject: {subject}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=\"UTF-8\"\r\n\r\n{body}",
        to = message.to.join(", "),
        subject = header_value(&message.subject),
        body = message.body_text,
    )
}

pub fn encode_raw(sender: &str, message: &EmailMessage) -> String {
    URL_SAFE.encode(render_mime(sender, message))
}

pub struct GmailMailer {
    client: GoogleClient,
    sender: String,
}

impl GmailMailer {
    pub fn new(client: GoogleClient, config: &EmailConfig) -> Self {
        Self { client, sender: config.sender.trim().to_string() }
    }

    pub async fn send_message(&self, message: &EmailMessage) -> Result<SentEmail, GoogleApiError> {
        if self.sender.is_empty() {
            return Err(GoogleApiError::Configuration("sender address not configured".to_string()));
        }
        let url = endpoint(GMAIL_API_BASE, &["users", "me", "messages", "send"])?;
        let body = SendBody { raw: encode_raw(&self.sender, message) };
        let sent: SentMessage = self
            .client
            .send_json(self.client.post(url).json(&body), &RetryPolicy::once())
            .await?;
        Ok(SentEmail { id: sent.id })
    }

    pub async fn profile(&self) -> Result<MailboxProfile, GoogleApiError> {
        let url = endpoint(GMAIL_API_BASE, &["users", "me", "profile"])?;
        self.client.send_json(self.client.get(url), &RetryPolicy::default()).await
    }
}

#[async_trait]
impl MailGateway for GmailMailer {
    async fn send(&self, message: &EmailMessage) -> ToolResult<SentEmail> {
        match self.send_message(message).await {
            Ok(sent) => {
                info!(
                    event_name = "adapters.google.gmail.sent",
                    message_id = %sent.id,
                    recipient_count = message.to.len(),
                );
                ToolResult::success(sent)
            }
            Err(error) => {
                warn!(event_name = "adapters.google.gmail.send_failed", error = %error);
                ToolResult::failure(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use agenda_core::config::{EmailConfig, EmailProvider};
    use agenda_core::domain::booking::EmailMessage;
    use agenda_core::gateway::MailGateway;
    use base64::engine::general_purpose::URL_SAFE;
    use base64::Engine;
    use secrecy::SecretString;

    use super::{encode_raw, render_mime, GmailMailer};
    use crate::google::GoogleClient;

    fn message(subject: &str) -> EmailMessage {
        EmailMessage {
            to: vec!["ada@example.com".to_string(), "grace@example.com".to_string()],
            subject: subject.to_string(),
            body_text: "You're invited to 'Sync'.\nStart: 2025-08-18T10:00:00".to_string(),
        }
    }

    #[test]
    fn mime_has_headers_then_body() {
        let mime = render_mime("me@example.com", &message("Invite: Sync"));
        assert!(mime.starts_with(
            "From: me@example.com\r\nTo: ada@example.com, grace@example.com\r\nSubject: Invite: Sync\r\n"
        ));
        assert!(mime.ends_with("\r\n\r\nYou're invited to 'Sync'.\nStart: 2025-08-18T10:00:00"));
    }

    #[test]
    fn non_ascii_subject_is_encoded() {
        let mime = render_mime("me@example.com", &message("Invite: Café"));
        assert!(mime.contains("Subject: =?UTF-8?B?"));
        assert!(!mime.contains("Café"));
    }

    #[test]
    fn raw_is_url_safe_base64_of_mime() {
        let raw = encode_raw("me@example.com", &message("Invite: Sync"));
        assert!(!raw.contains('+') && !raw.contains('/'));
        let decoded = URL_SAFE.decode(raw).expect("decode");
        assert_eq!(
            String::from_utf8(decoded).expect("utf8"),
            render_mime("me@example.com", &message("Invite: Sync"))
        );
    }

    #[tokio::test]
    async fn missing_sender_fails_without_network() {
        let client = GoogleClient::new(SecretString::from("token".to_string()), Duration::from_secs(1))
            .expect("client");
        let mailer = GmailMailer::new(
            client,
            &EmailConfig { provider: EmailProvider::Gmail, sender: " ".to_string() },
        );

        let result = mailer.send(&message("Invite: Sync")).await;

        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("sender address not configured"));
    }
}
