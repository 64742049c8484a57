//! # Minion Core
//!
//! Domain types, traits, and error definitions for the Minion daily digest.
//! This crate has **no I/O of its own** — it defines the model that the
//! providers, history stores, agents and delivery channels implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here:
//! - [`Provider`] — text-generation backends (chat and web-search modes)
//! - [`HistoryStore`] — durable dedup state across runs
//! - [`Channel`] — where a finished [`Digest`] is delivered
//!
//! Implementations live in their respective crates, so the agent layer can be
//! exercised end-to-end with scripted mocks.

pub mod channel;
pub mod digest;
pub mod error;
pub mod history;
pub mod latex;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use channel::Channel;
pub use digest::{Digest, Item, Section};
pub use error::{AgentError, Error, Result};
pub use history::{HistoryRecord, HistoryStore};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
