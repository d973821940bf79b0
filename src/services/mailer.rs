//! Delivery of account verification emails

use reqwest::Client as HttpClient;
use serde::Serialize;

use crate::error::{AppError, AppResult};

const VERIFICATION_SUBJECT: &str = "Confirm your Melodeck account";

/// Sends verification links to users
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, to: &str, link: &str) -> AppResult<()>;
}

/// Writes verification links to the log instead of sending them.
/// Used when no mail relay is configured.
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, to: &str, link: &str) -> AppResult<()> {
        tracing::info!(to = %to, link = %link, "No mail relay configured, verification link logged");
        Ok(())
    }
}

/// Posts messages to an HTTP mail relay
pub struct HttpMailer {
    http_client: HttpClient,
    relay_url: String,
    api_key: Option<String>,
    from: String,
}

#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: String,
}

impl HttpMailer {
    pub fn new(relay_url: String, api_key: Option<String>, from: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            relay_url,
            api_key,
            from,
        }
    }
}

#[async_trait::async_trait]
impl Mailer for HttpMailer {
    async fn send_verification(&self, to: &str, link: &str) -> AppResult<()> {
        let message = RelayMessage {
            from: &self.from,
            to,
            subject: VERIFICATION_SUBJECT,
            html: verification_body(link),
        };

        let mut request = self.http_client.post(&self.relay_url).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Delivery(format!(
                "Relay returned status {}: {}",
                status, body
            )));
        }

        tracing::info!(to = %to, "Verification email sent");
        Ok(())
    }
}

/// HTML body of the verification email
pub fn verification_body(link: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; padding: 20px; background-color: #f3f4f6;">
    <div style="max-width: 600px; margin: 0 auto; background: white; padding: 20px; border-radius: 10px;">
        <h2 style="color: #4f46e5;">Welcome to Melodeck!</h2>
        <p>Click the button below to activate your account:</p>
        <a href="{link}" style="display: inline-block; padding: 10px 20px; background-color: #4f46e5; color: white; text-decoration: none; border-radius: 5px; font-weight: bold;">ACTIVATE ACCOUNT</a>
        <p style="margin-top: 20px; color: #666; font-size: 12px;">If the button does not work, paste this link into your browser:<br>{link}</p>
    </div>
</div>"#
    )
}
