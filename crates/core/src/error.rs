//! Error types for the Minion domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Minion operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- History errors ---
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    // --- Channel errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Agent errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned no text: {0}")]
    EmptyResponse(String),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to serialize history: {0}")]
    Serialization(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("Digest delivery failed to {channel}: {reason}")]
    DeliveryFailed { channel: String, reason: String },
}

/// Failures an agent reports instead of a Section.
///
/// The runner turns every one of these into a diagnostic Section, so none of
/// them can abort a digest build.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("backend call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("history update failed: {0}")]
    History(#[from] HistoryError),

    #[error("HTTP fetch failed for {url}: {reason}")]
    Http { url: String, reason: String },

    #[error("invalid agent configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown agent type: {0}")]
    UnknownType(String),

    #[error("agent panicked: {0}")]
    Panicked(String),
}
