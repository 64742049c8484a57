//! Content agents, one module per kind.
//!
//! Every agent is `run(config, heading, ctx) -> Result<Section, AgentError>`
//! and makes exactly one generation call (or one round of page fetches).
//! Recoverable trouble, such as unparseable output or zero valid results,
//! becomes a fallback item inside `Ok`. An `Err` is left for the runner to
//! turn into a diagnostic section.

pub mod groceries;
pub mod horoscope;
pub mod live_search;
pub mod math;
pub mod scripture;
pub mod web_search;

use minion_config::AgentSpec;
use minion_core::digest::Section;
use minion_core::error::AgentError;

use crate::context::AgentContext;

/// Raw text kept in a fallback item.
pub const FALLBACK_MAX_CHARS: usize = 1500;

/// Route a spec to its agent.
pub async fn dispatch(
    spec: &AgentSpec,
    heading: &str,
    ctx: &AgentContext,
) -> Result<Section, AgentError> {
    match spec {
        AgentSpec::Math(cfg) => math::run(cfg, heading, ctx).await,
        AgentSpec::Bible(cfg) => scripture::run(cfg, heading, ctx).await,
        AgentSpec::Horoscope(cfg) => horoscope::run(cfg, heading, ctx).await,
        AgentSpec::LiveSearch(cfg) => live_search::run(cfg, heading, ctx).await,
        AgentSpec::WebSearch(cfg) => web_search::run(cfg, heading, ctx).await,
        AgentSpec::Groceries(cfg) => groceries::run(cfg, heading, ctx).await,
        AgentSpec::Unknown { type_name } => Err(AgentError::UnknownType(type_name.clone())),
        AgentSpec::Invalid { type_name, reason } => Err(AgentError::InvalidConfig(format!(
            "{type_name}: {reason}"
        ))),
    }
}
