// src/notify/resend.rs
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::format::EmailMessage;
use super::EmailSink;
use crate::config::EmailSettings;
use crate::error::{Channel, NotifyError};

/// Resend transactional email API (`POST /emails`).
pub struct ResendEmail {
    endpoint: String,
    api_key: String,
    from: String,
    to: Vec<String>,
    client: Client,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    id: String,
}

impl ResendEmail {
    pub fn new(
        base_url: &str,
        settings: &EmailSettings<'_>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| NotifyError::Request {
                channel: Channel::Email,
                source,
            })?;
        Ok(Self {
            endpoint: format!("{}/emails", base_url.trim_end_matches('/')),
            api_key: settings.api_key.to_string(),
            from: settings.from.to_string(),
            to: settings.to.to_vec(),
            client,
        })
    }

    pub fn recipients(&self) -> &[String] {
        &self.to
    }
}

#[async_trait::async_trait]
impl EmailSink for ResendEmail {
    async fn send(&self, msg: &EmailMessage) -> Result<String, NotifyError> {
        let payload = SendEmailRequest {
            from: &self.from,
            to: &self.to,
            subject: &msg.subject,
            html: &msg.html,
            text: &msg.text,
        };

        let rsp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|source| NotifyError::Request {
                channel: Channel::Email,
                source,
            })?;

        let status = rsp.status();
        let body = rsp.text().await.map_err(|source| NotifyError::Request {
            channel: Channel::Email,
            source,
        })?;
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                channel: Channel::Email,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SendEmailResponse =
            serde_json::from_str(&body).map_err(|e| NotifyError::InvalidResponse {
                channel: Channel::Email,
                reason: format!("{e}; body: {body}"),
            })?;
        Ok(parsed.id)
    }
}
