//! Webhook channel — POSTs the digest as JSON.
//!
//! Payload: `{"subject", "date", "text", "html", "sections"}`. Any non-2xx
//! response counts as a failed delivery.

use async_trait::async_trait;
use minion_core::channel::Channel;
use minion_core::digest::Digest;
use minion_core::error::ChannelError;
use std::time::Duration;
use tracing::{debug, info};

use crate::render::{render_html, render_text};

pub struct WebhookChannel {
    url: String,
    client: reqwest::Client,
}

impl WebhookChannel {
    pub fn new(url: impl Into<String>) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ChannelError::NotConfigured(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// The JSON body sent for `digest`.
    pub fn payload(digest: &Digest) -> serde_json::Value {
        serde_json::json!({
            "subject": digest.title,
            "date": digest.date.format("%Y-%m-%d").to_string(),
            "text": render_text(digest),
            "html": render_html(digest),
            "sections": digest.sections,
        })
    }

    fn failed(&self, reason: String) -> ChannelError {
        ChannelError::DeliveryFailed {
            channel: "webhook".into(),
            reason,
        }
    }
}

#[async_trait]
impl Channel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn deliver(&self, digest: &Digest) -> Result<(), ChannelError> {
        debug!(url = %self.url, sections = digest.sections.len(), "Posting digest");

        let response = self
            .client
            .post(&self.url)
            .json(&Self::payload(digest))
            .send()
            .await
            .map_err(|e| self.failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.failed(format!("status {}: {body}", status.as_u16())));
        }

        info!(url = %self.url, status = status.as_u16(), "Digest delivered");
        Ok(())
    }
}
