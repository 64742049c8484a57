//! Configuration loading, validation, and management for Minion.
//!
//! Loads configuration from `~/.minion/config.toml` with environment
//! variable overrides, and the declarative topic file that drives a run.
//! Validates all settings at startup.

pub mod topics;

pub use topics::{
    AgentSpec, BibleConfig, GroceriesConfig, HoroscopeConfig, LiveSearchConfig, MathConfig,
    Retailer, SearchSchema, TopicDefaults, TopicSpec, TopicsFile, WebSearchConfig,
};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.minion/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default text-generation provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model for generation agents
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default model for live-search agents
    #[serde(default = "default_model")]
    pub search_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Timeout for plain HTTP fetches (search pages, ad pages)
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Topic file driving the run
    #[serde(default = "default_topics_path")]
    pub topics_path: PathBuf,

    /// Where the dedup history lives
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Where and how the finished digest goes
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Reader profile used by personalized agents
    #[serde(default)]
    pub profile: ProfileConfig,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_http_timeout() -> u64 {
    15
}
fn default_topics_path() -> PathBuf {
    PathBuf::from("topics.toml")
}
fn default_history_path() -> PathBuf {
    PathBuf::from("data").join("history.json")
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("search_model", &self.search_model)
            .field("default_temperature", &self.default_temperature)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("topics_path", &self.topics_path)
            .field("history_path", &self.history_path)
            .field("providers", &self.providers)
            .field("delivery", &self.delivery)
            .field("profile", &self.profile)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

/// Delivery settings for the finished digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// "stdout", "file", "webhook" or "email"
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Directory for the "file" channel
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Endpoint for the "webhook" channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Digest title and email subject
    #[serde(default = "default_subject")]
    pub subject: String,

    /// SMTP settings for the "email" channel
    #[serde(default)]
    pub email: EmailConfig,
}

fn default_channel() -> String {
    "stdout".into()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("digests")
}
fn default_subject() -> String {
    "Daily Digest".into()
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            output_dir: default_output_dir(),
            webhook_url: None,
            subject: default_subject(),
            email: EmailConfig::default(),
        }
    }
}

/// SMTP submission over STARTTLS.
///
/// Credentials usually come from `EMAIL_USER`, `EMAIL_PASS` and `RECIPIENT`.
#[derive(Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Login name, also used as the sender address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".into()
}
fn default_smtp_port() -> u16 {
    587
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            recipient: None,
        }
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("recipient", &self.recipient)
            .finish()
    }
}

/// Reader profile for personalized prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Birth date, place and time, free-form
    #[serde(default = "default_birth")]
    pub birth: String,

    /// Interpretive framing passed to the horoscope prompt
    #[serde(default = "default_framing")]
    pub framing: String,
}

fn default_birth() -> String {
    "21 Oct 1990, Odense, Denmark, 16:07 (CET)".into()
}
fn default_framing() -> String {
    "Assume a modern psychological astrology framing.".into()
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            birth: default_birth(),
            framing: default_framing(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.minion/config.toml).
    ///
    /// Also checks environment variables:
    /// - `MINION_API_KEY` (highest priority), `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`
    /// - `MINION_PROVIDER`, `MINION_MODEL`, `MINION_TOPICS`, `MINION_HISTORY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load a specific file, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if self.api_key.is_none() {
            self.api_key = std::env::var("MINION_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                .filter(|k| !k.trim().is_empty());
        }

        if let Ok(provider) = std::env::var("MINION_PROVIDER") {
            self.default_provider = provider;
        }

        if let Ok(model) = std::env::var("MINION_MODEL") {
            self.default_model = model;
        }

        if let Ok(topics) = std::env::var("MINION_TOPICS") {
            self.topics_path = PathBuf::from(topics);
        }

        if let Ok(history) = std::env::var("MINION_HISTORY") {
            self.history_path = PathBuf::from(history);
        }

        let email = &mut self.delivery.email;
        for (slot, var) in [
            (&mut email.username, "EMAIL_USER"),
            (&mut email.password, "EMAIL_PASS"),
            (&mut email.recipient, "RECIPIENT"),
        ] {
            if slot.is_none() {
                *slot = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
            }
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".minion")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "http_timeout_secs must be > 0".into(),
            ));
        }

        if self.delivery.channel == "webhook" && self.delivery.webhook_url.is_none() {
            return Err(ConfigError::ValidationError(
                "delivery.webhook_url is required for the webhook channel".into(),
            ));
        }

        Ok(())
    }

    /// Fail fast when a secret the run cannot do without is missing.
    ///
    /// This is one of the only two conditions allowed to abort a run; the
    /// other is final delivery failure.
    pub fn require_secrets(&self) -> Result<(), ConfigError> {
        let provider_key = self
            .providers
            .get(&self.default_provider)
            .and_then(|p| p.api_key.as_ref());

        let local = matches!(self.default_provider.as_str(), "ollama" | "vllm" | "llamacpp");
        if self.api_key.is_none() && provider_key.is_none() && !local {
            return Err(ConfigError::MissingSecret(
                "MINION_API_KEY (or OPENAI_API_KEY / ANTHROPIC_API_KEY)".into(),
            ));
        }

        if self.delivery.channel == "email" {
            let email = &self.delivery.email;
            let missing: Vec<&str> = [
                (email.username.is_none(), "EMAIL_USER"),
                (email.password.is_none(), "EMAIL_PASS"),
                (email.recipient.is_none(), "RECIPIENT"),
            ]
            .into_iter()
            .filter_map(|(absent, name)| absent.then_some(name))
            .collect();
            if !missing.is_empty() {
                return Err(ConfigError::MissingSecret(missing.join(", ")));
            }
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            search_model: default_model(),
            default_temperature: default_temperature(),
            http_timeout_secs: default_http_timeout(),
            topics_path: default_topics_path(),
            history_path: default_history_path(),
            providers: HashMap::new(),
            delivery: DeliveryConfig::default(),
            profile: ProfileConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required secret: {0}")]
    MissingSecret(String),
}
