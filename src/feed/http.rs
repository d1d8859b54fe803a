// src/feed/http.rs
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::histogram;
use reqwest::{Client, StatusCode};

use crate::error::FetchError;
use crate::feed::types::FeedSource;

pub const USER_AGENT: &str = concat!("dispatch-monitor/", env!("CARGO_PKG_VERSION"));

/// Live feed over HTTP GET with a bounded timeout.
pub struct HttpFeed {
    url: String,
    client: Client,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let url = url.into();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::from_reqwest(&url, e))?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<String, FetchError> {
        let t0 = Instant::now();
        tracing::debug!(url = %self.url, "fetching feed");

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&self.url, e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&self.url, e))?;

        histogram!("monitor_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        tracing::debug!(bytes = body.len(), "fetched feed");
        Ok(body)
    }

    fn name(&self) -> &str {
        "http"
    }
}
