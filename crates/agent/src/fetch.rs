//! Plain HTTP page fetching for the scraping agents.

use async_trait::async_trait;
use minion_core::error::AgentError;
use std::time::Duration;

/// Desktop browser User-Agent; several retailer sites refuse bare clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/123.0 Safari/537.36";

/// Fetch a URL as text.
#[async_trait]
pub trait WebFetch: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String, AgentError>;
}

/// [`WebFetch`] over `reqwest` with an explicit per-request timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AgentError::InvalidConfig(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebFetch for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String, AgentError> {
        let http_err = |reason: String| AgentError::Http {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| http_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(http_err(format!("status {}", status.as_u16())));
        }

        response.text().await.map_err(|e| http_err(e.to_string()))
    }
}
