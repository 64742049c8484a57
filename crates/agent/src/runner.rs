//! Agent runner: one agent invocation behind a total failure boundary.
//!
//! `run` always returns a renderable Section. An agent `Err`, a panic
//! inside the agent, or an unknown/invalid config entry all become a
//! one-item diagnostic Section tagged with the agent type and heading.
//! Agent output that breaks the Section shape is coerced back into it.

use futures::FutureExt;
use minion_config::AgentSpec;
use minion_core::digest::{Item, Section};
use minion_core::error::AgentError;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{info, warn};

use crate::agents::{self, FALLBACK_MAX_CHARS};
use crate::context::AgentContext;

/// Runs agents against a shared [`AgentContext`].
#[derive(Clone)]
pub struct AgentRunner {
    ctx: Arc<AgentContext>,
}

impl AgentRunner {
    pub fn new(ctx: Arc<AgentContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &AgentContext {
        &self.ctx
    }

    /// Run one agent. Never fails.
    pub async fn run(&self, spec: &AgentSpec, heading: &str) -> Section {
        let agent_type = spec.type_name();
        let outcome = AssertUnwindSafe(agents::dispatch(spec, heading, &self.ctx))
            .catch_unwind()
            .await;

        let result = match outcome {
            Ok(result) => result,
            Err(payload) => Err(AgentError::Panicked(panic_message(payload.as_ref()))),
        };

        match result {
            Ok(section) => {
                let section = coerce(section, heading);
                info!(agent_type, heading, items = section.items.len(), "Agent finished");
                section
            }
            Err(error) => {
                warn!(agent_type, heading, error = %error, "Agent failed, emitting diagnostic");
                diagnostic_section(agent_type, heading, &error)
            }
        }
    }
}

/// One-item Section describing why an agent produced nothing.
pub fn diagnostic_section(agent_type: &str, heading: &str, error: &AgentError) -> Section {
    let message = match error {
        AgentError::UnknownType(_) => error.to_string(),
        _ => format!("⚠️ Error running {agent_type} for \"{heading}\": {error}"),
    };
    Section::single(heading, Item::fallback(agent_type, &message, FALLBACK_MAX_CHARS))
}

/// Restore the Section shape: the caller's heading, and a usable body on
/// every item. An empty item list is left to the orchestrator.
fn coerce(mut section: Section, heading: &str) -> Section {
    if section.heading.trim().is_empty() {
        section.heading = heading.to_string();
    }
    for item in &mut section.items {
        if !item.is_well_formed() {
            let repaired = Item::new(std::mem::take(&mut item.title), "");
            item.title = repaired.title;
            item.rendered = repaired.rendered;
        }
    }
    section
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}
