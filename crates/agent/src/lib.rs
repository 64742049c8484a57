//! The agent layer — turns a topic file into digest Sections.
//!
//! 1. **Orchestrator** walks the topics in file order
//! 2. **Runner** invokes each configured agent behind a failure boundary
//! 3. **Agent** makes one backend call (or one round of page fetches)
//! 4. **Extractor** recovers structured output from whatever came back
//! 5. Validated results are committed to history and emitted as Items
//!
//! Every path ends in a renderable Section; nothing here aborts a build.

pub mod agents;
pub mod context;
pub mod extract;
pub mod fetch;
pub mod orchestrator;
pub mod runner;

#[cfg(test)]
mod test_helpers;

pub use context::{AgentContext, AgentSettings};
pub use extract::extract_record;
pub use fetch::{HttpFetcher, WebFetch};
pub use orchestrator::{EMPTY_TOPIC_TEXT, TopicOrchestrator};
pub use runner::{AgentRunner, diagnostic_section};
