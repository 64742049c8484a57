//! Topic orchestrator: runs every topic's agents and assembles the digest.
//!
//! Topics, and agents within a topic, run strictly one after another in
//! file order. Agents of one topic are concatenated in declaration order,
//! cut to the topic's item cap, and an empty result gets a placeholder.
//! One Section per topic, in topic order, each with at least one item.

use minion_config::{TopicSpec, TopicsFile};
use minion_core::digest::{Digest, Item, Section};
use tracing::{debug, info};

use crate::runner::AgentRunner;

/// Body of the item that stands in for an empty topic.
pub const EMPTY_TOPIC_TEXT: &str = "No items produced.";

pub struct TopicOrchestrator {
    runner: AgentRunner,
}

impl TopicOrchestrator {
    pub fn new(runner: AgentRunner) -> Self {
        Self { runner }
    }

    /// Run all topics, in order.
    pub async fn build_sections(&self, topics: &TopicsFile) -> Vec<Section> {
        let mut sections = Vec::with_capacity(topics.topics.len());
        for topic in &topics.topics {
            let cap = topic.cap(&topics.defaults);
            sections.push(self.build_topic(topic, cap).await);
        }
        info!(
            sections = sections.len(),
            items = sections.iter().map(|s| s.items.len()).sum::<usize>(),
            "Digest sections built"
        );
        sections
    }

    /// Run all topics and wrap them in a dated [`Digest`].
    pub async fn build_digest(&self, title: &str, topics: &TopicsFile) -> Digest {
        let sections = self.build_sections(topics).await;
        Digest::new(title, self.runner.context().today, sections)
    }

    async fn build_topic(&self, topic: &TopicSpec, cap: usize) -> Section {
        let mut items = Vec::new();
        for spec in &topic.agents {
            let section = self.runner.run(spec, &topic.heading).await;
            items.extend(section.items);
        }

        let produced = items.len();
        items.truncate(cap);
        if items.is_empty() {
            items.push(Item::new(&topic.heading, EMPTY_TOPIC_TEXT));
        }

        debug!(
            heading = %topic.heading,
            agents = topic.agents.len(),
            produced,
            kept = items.len(),
            "Topic assembled"
        );
        Section::new(&topic.heading, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use minion_memory::InMemoryHistory;
    use std::sync::Arc;

    fn orchestrator(provider: SequentialMockProvider) -> TopicOrchestrator {
        let ctx = test_context(Arc::new(provider), Arc::new(InMemoryHistory::new()));
        TopicOrchestrator::new(AgentRunner::new(Arc::new(ctx)))
    }

    fn topics(toml: &str) -> TopicsFile {
        TopicsFile::from_toml_str(toml).unwrap()
    }

    #[tokio::test]
    async fn one_section_per_topic_in_order() {
        let file = topics(
            r#"
[[topics]]
heading = "First"
[[topics.agents]]
type = "nope"

[[topics]]
heading = "Empty"

[[topics]]
heading = "Third"
[[topics.agents]]
type = "llm_bible"
"#,
        );
        let orch = orchestrator(SequentialMockProvider::single_text(
            r#"{"bible": {"reference": "Psalm 1:1", "text": "Blessed is the man"}}"#,
        ));

        let sections = orch.build_sections(&file).await;

        let headings: Vec<_> = sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["First", "Empty", "Third"]);
        assert!(sections.iter().all(|s| !s.items.is_empty()));
        assert_eq!(sections[0].items[0].rendered, "Unknown agent type: nope");
        assert_eq!(sections[1].items[0].rendered, EMPTY_TOPIC_TEXT);
        assert_eq!(sections[2].items[0].title, "Psalm 1:1");
    }

    #[tokio::test]
    async fn items_concatenated_then_truncated() {
        let file = topics(
            r#"
[defaults]
max_items_per_section = 3

[[topics]]
heading = "Practice"
[[topics.agents]]
type = "llm_math"
count = 2
[[topics.agents]]
type = "llm_math"
count = 2
"#,
        );
        let orch = orchestrator(SequentialMockProvider::texts(&[
            r#"{"math":[{"problem":"p1"},{"problem":"p2"}]}"#,
            r#"{"math":[{"problem":"p3"},{"problem":"p4"}]}"#,
        ]));

        let sections = orch.build_sections(&file).await;
        let titles: Vec<_> = sections[0].items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn per_topic_cap_overrides_default() {
        let file = topics(
            r#"
[[topics]]
heading = "Practice"
max_items_per_section = 1
[[topics.agents]]
type = "llm_math"
count = 2
"#,
        );
        let orch = orchestrator(SequentialMockProvider::single_text(
            r#"{"math":[{"problem":"p1"},{"problem":"p2"}]}"#,
        ));

        let sections = orch.build_sections(&file).await;
        assert_eq!(sections[0].items.len(), 1);
    }

    #[tokio::test]
    async fn digest_carries_run_date() {
        let orch = orchestrator(SequentialMockProvider::new(vec![]));
        let digest = orch.build_digest("Daily", &TopicsFile::default()).await;
        assert_eq!(digest.date, test_today());
        assert!(digest.sections.is_empty());
    }
}
