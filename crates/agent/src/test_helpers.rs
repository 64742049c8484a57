//! Shared test helpers for agent tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use minion_core::error::{AgentError, ProviderError};
use minion_core::history::HistoryStore;
use minion_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use minion_memory::InMemoryHistory;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::context::{AgentContext, AgentSettings};
use crate::fetch::WebFetch;

/// A mock provider that returns a sequence of scripted results.
///
/// Each call to `complete` returns the next result in the queue and records
/// the request. Panics if more calls are made than results provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn single_text(text: &str) -> Self {
        Self::new(vec![Ok(make_text_response(text))])
    }

    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(make_text_response(t))).collect())
    }

    pub fn failing(err: ProviderError) -> Self {
        Self::new(vec![Err(err)])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let call = requests.len();

        if call >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                call,
                responses.len()
            );
        }

        requests.push(request);
        responses[call].clone()
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        text: text.to_string(),
        model: "mock-model".into(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
    }
}

/// Serves canned pages by URL; unknown URLs fail like a 404.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebFetch for MockFetcher {
    async fn get_text(&self, url: &str) -> Result<String, AgentError> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| AgentError::Http {
            url: url.to_string(),
            reason: "status 404".into(),
        })
    }
}

pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

/// Context over the given provider and history, no network, no fetch delay.
pub fn test_context(
    provider: Arc<dyn Provider>,
    history: Arc<dyn HistoryStore>,
) -> AgentContext {
    test_context_with_fetcher(provider, history, Arc::new(MockFetcher::default()))
}

pub fn test_context_with_fetcher(
    provider: Arc<dyn Provider>,
    history: Arc<dyn HistoryStore>,
    fetcher: Arc<dyn WebFetch>,
) -> AgentContext {
    let settings = AgentSettings {
        fetch_delay: Duration::ZERO,
        ..AgentSettings::default()
    };
    AgentContext::new(provider, history, fetcher, settings).with_today(test_today())
}

/// A context whose provider and fetcher are never expected to be called.
pub fn idle_context() -> (AgentContext, Arc<InMemoryHistory>) {
    let history = Arc::new(InMemoryHistory::new());
    let ctx = test_context(Arc::new(SequentialMockProvider::new(vec![])), history.clone());
    (ctx, history)
}
