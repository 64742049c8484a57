//! Provider router — selects the correct backend based on config.

use std::collections::HashMap;
use std::sync::Arc;
use minion_core::error::ProviderError;
use minion_core::provider::Provider;
use tracing::warn;
use crate::anthropic::AnthropicProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Holds the configured backends and knows which one is the default.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names.
    pub fn list(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }
}

/// Build providers from configuration.
///
/// A backend that cannot be constructed is logged and left out, so asking
/// for it later yields `None`.
pub fn build_from_config(config: &minion_config::AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        register(&mut router, name, &api_key, provider_config.api_url.as_deref());
    }

    // Ensure the default provider exists (even if not explicitly configured)
    if router.get(&config.default_provider).is_none() {
        let api_key = config.api_key.clone().unwrap_or_default();
        register(&mut router, &config.default_provider, &api_key, None);
    }

    router
}

fn register(router: &mut ProviderRouter, name: &str, api_key: &str, api_url: Option<&str>) {
    match build_one(name, api_key, api_url) {
        Ok(provider) => router.register(name, provider),
        Err(e) => warn!(provider = name, error = %e, "Provider unavailable"),
    }
}

fn build_one(
    name: &str,
    api_key: &str,
    api_url: Option<&str>,
) -> Result<Arc<dyn Provider>, ProviderError> {
    if name == "anthropic" {
        let mut p = AnthropicProvider::new(api_key)?;
        if let Some(url) = api_url {
            p = p.with_base_url(url);
        }
        Ok(Arc::new(p))
    } else {
        let base_url = api_url
            .map(String::from)
            .unwrap_or_else(|| default_base_url(name));
        Ok(Arc::new(OpenAiCompatProvider::new(name, base_url, api_key)?))
    }
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => "https://api.openai.com/v1".into(),
    }
}
