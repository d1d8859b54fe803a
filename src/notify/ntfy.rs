// src/notify/ntfy.rs
use std::time::Duration;

use reqwest::Client;

use super::format::PushMessage;
use super::PushSink;
use crate::error::{Channel, NotifyError};

/// ntfy-style pub/sub relay: plain-text POST to `<base>/<topic>`.
#[derive(Clone)]
pub struct NtfyPush {
    url: String,
    client: Client,
}

impl NtfyPush {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| NotifyError::Request {
                channel: Channel::Push,
                source,
            })?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl PushSink for NtfyPush {
    async fn push(&self, msg: &PushMessage) -> Result<(), NotifyError> {
        let rsp = self
            .client
            .post(&self.url)
            .header("Title", msg.title.as_str())
            .header("Priority", msg.priority)
            .header("Tags", msg.tags)
            .body(msg.body.clone())
            .send()
            .await
            .map_err(|source| NotifyError::Request {
                channel: Channel::Push,
                source,
            })?;

        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                channel: Channel::Push,
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
