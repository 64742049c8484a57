//! `minion run` — build today's digest and deliver it.

use minion_agent::{AgentContext, AgentRunner, AgentSettings, HttpFetcher, TopicOrchestrator};
use minion_channels::{StdoutChannel, build_channel};
use minion_config::TopicsFile;
use minion_core::channel::Channel;
use minion_core::history::HistoryStore;
use minion_memory::{FileHistory, NoopHistory};
use minion_providers::build_from_config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, info, info_span};

pub async fn run(
    config_path: Option<&Path>,
    topics: Option<PathBuf>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    config.require_secrets()?;

    let topics_path = topics.unwrap_or_else(|| config.topics_path.clone());
    let topics = TopicsFile::load(&topics_path)?;

    let router = build_from_config(&config);
    let provider = router
        .default()
        .ok_or_else(|| format!("provider '{}' is not available", config.default_provider))?;

    let history: Arc<dyn HistoryStore> = if dry_run {
        Arc::new(NoopHistory)
    } else {
        Arc::new(FileHistory::new(&config.history_path))
    };
    let channel: Arc<dyn Channel> = if dry_run {
        Arc::new(StdoutChannel::new())
    } else {
        build_channel(&config.delivery)?
    };

    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(config.http_timeout_secs))?);
    let ctx = AgentContext::new(provider, history, fetcher, AgentSettings::from_config(&config));
    let orchestrator = TopicOrchestrator::new(AgentRunner::new(Arc::new(ctx)));

    let run_id = uuid::Uuid::new_v4();
    let span = info_span!("run", %run_id);
    async move {
        info!(
            topics = topics.topics.len(),
            path = %topics_path.display(),
            provider = %config.default_provider,
            dry_run,
            "Building digest"
        );

        let digest = orchestrator
            .build_digest(&config.delivery.subject, &topics)
            .await;

        channel.deliver(&digest).await?;
        info!(
            channel = channel.name(),
            sections = digest.sections.len(),
            items = digest.item_count(),
            "Run complete"
        );
        Ok(())
    }
    .instrument(span)
    .await
}
