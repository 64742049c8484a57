//! Everything an agent needs from the outside world, passed in explicitly.

use chrono::NaiveDate;
use minion_config::{AppConfig, ProfileConfig};
use minion_core::error::AgentError;
use minion_core::history::HistoryStore;
use minion_core::message::Message;
use minion_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::fetch::WebFetch;

/// Pause between page fetches of the plain web-search agent.
pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_millis(800);

/// Run-wide settings taken from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub default_model: String,
    pub search_model: String,
    pub temperature: f32,
    pub fetch_delay: Duration,
    pub profile: ProfileConfig,
}

impl AgentSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let provider_model = config
            .providers
            .get(&config.default_provider)
            .and_then(|p| p.default_model.clone());

        Self {
            default_model: provider_model.unwrap_or_else(|| config.default_model.clone()),
            search_model: config.search_model.clone(),
            temperature: config.default_temperature,
            fetch_delay: DEFAULT_FETCH_DELAY,
            profile: config.profile.clone(),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Shared handles for one digest run.
///
/// The history store is a handle, not a snapshot: agents load the record
/// at the start of their invocation and save it after a validated result.
pub struct AgentContext {
    pub provider: Arc<dyn Provider>,
    pub history: Arc<dyn HistoryStore>,
    pub fetcher: Arc<dyn WebFetch>,
    pub settings: AgentSettings,
    /// The digest date; recency windows and the horoscope marker use it.
    pub today: NaiveDate,
}

impl AgentContext {
    pub fn new(
        provider: Arc<dyn Provider>,
        history: Arc<dyn HistoryStore>,
        fetcher: Arc<dyn WebFetch>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            provider,
            history,
            fetcher,
            settings,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Pin the run date (tests, backfills).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// One backend round trip; returns the response text.
    pub(crate) async fn generate(
        &self,
        model: &str,
        messages: Vec<Message>,
        web_search: bool,
    ) -> Result<String, AgentError> {
        let mut request =
            ProviderRequest::new(model, messages).with_temperature(self.settings.temperature);
        if web_search {
            request = request.with_web_search();
        }

        debug!(
            provider = self.provider.name(),
            model,
            web_search,
            "Calling text-generation backend"
        );

        let response = self.provider.complete(request).await?;
        Ok(response.text)
    }
}
