//! End-to-end tests for a digest run.
//!
//! These drive the full pipeline through the public crates: topic file →
//! orchestrator → runner → agents → history → delivery channel, with a
//! scripted backend standing in for the network.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use minion_agent::agents::math::fingerprint;
use minion_agent::{
    AgentContext, AgentRunner, AgentSettings, EMPTY_TOPIC_TEXT, HttpFetcher, TopicOrchestrator,
};
use minion_channels::FileChannel;
use minion_config::TopicsFile;
use minion_core::channel::Channel;
use minion_core::digest::Digest;
use minion_core::error::ProviderError;
use minion_core::history::{HistoryStore, MAX_MATH_HASHES};
use minion_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use minion_memory::{FileHistory, InMemoryHistory, NoopHistory};
use tempfile::TempDir;

// ── Scripted backend ─────────────────────────────────────────────────────

/// Returns scripted responses in sequence and records each request.
struct ScriptedProvider {
    responses: Mutex<Vec<String>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let call = requests.len();
        if call >= responses.len() {
            panic!(
                "ScriptedProvider exhausted: call #{}, have {}",
                call,
                responses.len()
            );
        }
        requests.push(request);
        Ok(ProviderResponse {
            text: responses[call].clone(),
            model: "e2e-model".into(),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
        })
    }
}

// ── Harness ──────────────────────────────────────────────────────────────

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

fn orchestrator(provider: Arc<ScriptedProvider>, history: Arc<dyn HistoryStore>) -> TopicOrchestrator {
    let settings = AgentSettings {
        fetch_delay: Duration::ZERO,
        ..AgentSettings::default()
    };
    // None of these topics fetch pages; the real fetcher is never called.
    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(1)).unwrap());
    let ctx = AgentContext::new(provider, history, fetcher, settings).with_today(today());
    TopicOrchestrator::new(AgentRunner::new(Arc::new(ctx)))
}

fn topics(toml: &str) -> TopicsFile {
    TopicsFile::from_toml_str(toml).unwrap()
}

const MATH_TOPIC: &str = r#"
[[topics]]
heading = "Math practice"
[[topics.agents]]
type = "llm_math"
count = 2
"#;

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn practice_problems_recorded_in_history() {
    let provider = Arc::new(ScriptedProvider::new(&[
        r#"{"math":[{"problem":"Solve $3x-4=11$","tip":"Add 4 first"},{"problem":"Differentiate $x^3$","tip":"Power rule"}]}"#,
    ]));
    let history = Arc::new(InMemoryHistory::new());

    let digest = orchestrator(provider.clone(), history.clone())
        .build_digest("Daily Digest", &topics(MATH_TOPIC))
        .await;

    assert_eq!(digest.sections.len(), 1);
    let section = &digest.sections[0];
    assert_eq!(section.heading, "Math practice");
    assert_eq!(section.items.len(), 2);
    assert_eq!(section.items[0].rendered, "Solve $3x-4=11$\n  Tip: Add 4 first");
    assert!(section.items[1].image_url.is_some());

    let record = history.snapshot().await;
    assert_eq!(record.math_hashes.len(), 2);
    assert!(record.has_math_hash(&fingerprint("solve $3x-4=11$")));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn prose_wrapped_json_with_trailing_commas_is_repaired() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "Sure! Here are today's problems:\n\
         {\"math\": [\n\
           {\"problem\": \"Compute 7 * 8\", \"tip\": \"Think 7 * 4 twice\"},\n\
           {\"problem\": \"Is 91 prime?\", \"tip\": \"Try 7\"},\n\
         ]}\n\
         Good luck!",
    ]));
    let history = Arc::new(InMemoryHistory::new());

    let digest = orchestrator(provider, history.clone())
        .build_digest("Daily Digest", &topics(MATH_TOPIC))
        .await;

    let titles: Vec<_> = digest.sections[0].items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Compute 7 * 8", "Is 91 prime?"]);
    assert_eq!(history.snapshot().await.math_hashes.len(), 2);
}

#[tokio::test]
async fn stale_live_search_result_leaves_only_raw_fallback() {
    let raw = r#"{"items":[{"title":"Wind farm opens","summary":"Big news","url":"https://news.example/wind","date":"2026-03-04"}]}"#;
    let provider = Arc::new(ScriptedProvider::new(&[raw]));

    let file = topics(
        r#"
[[topics]]
heading = "Good news"
[[topics.agents]]
type = "llm_search"
schema = "good_news"
"#,
    );
    let digest = orchestrator(provider.clone(), Arc::new(NoopHistory))
        .build_digest("Daily Digest", &file)
        .await;

    let items = &digest.sections[0].items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "good_news (fallback)");
    assert_eq!(items[0].rendered, raw);
    assert!(provider.requests.lock().unwrap()[0].web_search);
}

#[tokio::test]
async fn unknown_agent_type_does_not_abort_the_run() {
    let provider = Arc::new(ScriptedProvider::new(&[
        r#"{"bible":{"reference":"John 1:5","text":"The light shines in the darkness."}}"#,
    ]));
    let file = topics(
        r#"
[[topics]]
heading = "Mystery"
[[topics.agents]]
type = "llm_weather"

[[topics]]
heading = "Scripture"
[[topics.agents]]
type = "llm_bible"
"#,
    );

    let digest = orchestrator(provider, Arc::new(InMemoryHistory::new()))
        .build_digest("Daily Digest", &file)
        .await;

    assert_eq!(digest.sections.len(), 2);
    assert_eq!(digest.sections[0].items.len(), 1);
    assert!(digest.sections[0].items[0].rendered.contains("llm_weather"));
    assert_eq!(
        digest.sections[1].items[0].rendered,
        "John 1:5 — The light shines in the darkness."
    );
}

// ── Assembly ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn mixed_topics_keep_file_order_and_caps() {
    let provider = Arc::new(ScriptedProvider::new(&[
        r#"{"horoscope":{"daily":"Plan before you push.","week":"Rest on Sunday."}}"#,
        r#"{"math":[{"problem":"a"},{"problem":"b"},{"problem":"c"}]}"#,
        r#"{"math":[{"problem":"d"}]}"#,
    ]));
    let file = topics(
        r#"
[defaults]
max_items_per_section = 3

[[topics]]
heading = "Horoscope"
[[topics.agents]]
type = "llm_horoscope"

[[topics]]
heading = "Nothing here"

[[topics]]
heading = "Practice"
max_items_per_section = 2
[[topics.agents]]
type = "llm_math"
count = 3
[[topics.agents]]
type = "llm_math"
count = 1
"#,
    );
    let history = Arc::new(InMemoryHistory::new());

    let digest = orchestrator(provider.clone(), history.clone())
        .build_digest("Daily Digest", &file)
        .await;

    let headings: Vec<_> = digest.sections.iter().map(|s| s.heading.as_str()).collect();
    assert_eq!(headings, vec!["Horoscope", "Nothing here", "Practice"]);
    assert_eq!(
        digest.sections[0].items[0].rendered,
        "Plan before you push.\n  Week: Rest on Sunday."
    );
    assert_eq!(digest.sections[1].items[0].rendered, EMPTY_TOPIC_TEXT);

    let practice: Vec<_> = digest.sections[2].items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(practice, vec!["a", "b"]);
    // Both agents ran; the cap applies after concatenation.
    assert_eq!(provider.calls(), 3);
    assert_eq!(history.snapshot().await.math_hashes.len(), 4);
    assert_eq!(history.snapshot().await.last_horoscope_date, "2026-03-14");
    assert_eq!(digest.item_count(), 4);
}

// ── History across runs ──────────────────────────────────────────────────

#[tokio::test]
async fn repeated_problem_suppressed_on_next_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state").join("history.json");

    let first = Arc::new(ScriptedProvider::new(&[
        r#"{"math":[{"problem":"Solve x+1=2"},{"problem":"Solve x+2=5"}]}"#,
    ]));
    orchestrator(first, Arc::new(FileHistory::new(&path)))
        .build_digest("Daily Digest", &topics(MATH_TOPIC))
        .await;
    assert!(path.exists());

    let second = Arc::new(ScriptedProvider::new(&[
        r#"{"math":[{"problem":"  SOLVE X+1=2 "},{"problem":"Solve 2x=8"}]}"#,
    ]));
    let digest = orchestrator(second, Arc::new(FileHistory::new(&path)))
        .build_digest("Daily Digest", &topics(MATH_TOPIC))
        .await;

    let titles: Vec<_> = digest.sections[0].items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Solve 2x=8"]);
    assert_eq!(FileHistory::new(&path).load().await.math_hashes.len(), 3);
}

#[tokio::test]
async fn history_stays_bounded_over_many_runs() {
    let history = Arc::new(InMemoryHistory::new());

    for run in 0..25 {
        let problems: Vec<String> = (0..10)
            .map(|i| format!(r#"{{"problem":"run {run} problem {i}"}}"#))
            .collect();
        let body = format!(r#"{{"math":[{}]}}"#, problems.join(","));
        let provider = Arc::new(ScriptedProvider::new(&[body.as_str()]));
        let file = topics(
            r#"
[[topics]]
heading = "Practice"
max_items_per_section = 10
[[topics.agents]]
type = "llm_math"
count = 10
"#,
        );
        orchestrator(provider, history.clone())
            .build_digest("Daily Digest", &file)
            .await;
    }

    let record = history.snapshot().await;
    assert_eq!(record.math_hashes.len(), MAX_MATH_HASHES);
    // Oldest evicted first: run 0..4 are gone, run 24 is present.
    assert!(!record.has_math_hash(&fingerprint("run 0 problem 0")));
    assert!(record.has_math_hash(&fingerprint("run 24 problem 9")));
}

#[tokio::test]
async fn dry_run_history_is_not_persisted() {
    let provider = Arc::new(ScriptedProvider::new(&[
        r#"{"math":[{"problem":"p"}]}"#,
        r#"{"math":[{"problem":"p"}]}"#,
    ]));
    let history: Arc<dyn HistoryStore> = Arc::new(NoopHistory);

    let orch = orchestrator(provider, history.clone());
    let file = topics(MATH_TOPIC);
    let first = orch.build_digest("Daily Digest", &file).await;
    let second = orch.build_digest("Daily Digest", &file).await;

    assert_eq!(first.sections[0].items[0].title, "p");
    assert_eq!(second.sections[0].items[0].title, "p");
    assert!(history.load().await.math_hashes.is_empty());
}

// ── Delivery ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn digest_written_by_file_channel() {
    let provider = Arc::new(ScriptedProvider::new(&[
        r#"{"math":[{"problem":"Integrate $2x$","tip":"Reverse the power rule"}]}"#,
    ]));
    let digest: Digest = orchestrator(provider, Arc::new(InMemoryHistory::new()))
        .build_digest("Morning Digest", &topics(MATH_TOPIC))
        .await;

    let dir = TempDir::new().unwrap();
    let channel = FileChannel::new(dir.path().join("out"));
    channel.deliver(&digest).await.unwrap();

    let html = std::fs::read_to_string(dir.path().join("out/digest-2026-03-14.html")).unwrap();
    let text = std::fs::read_to_string(dir.path().join("out/digest-2026-03-14.txt")).unwrap();
    assert!(html.contains("<h1>Morning Digest</h1>"));
    assert!(html.contains("<h2>Math practice</h2>"));
    assert!(html.contains("latex.codecogs.com"));
    assert!(text.contains("Integrate $2x$"));
    assert!(text.contains("Tip: Reverse the power rule"));
}
