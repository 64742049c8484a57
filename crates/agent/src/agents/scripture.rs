//! Daily scripture excerpt.
//!
//! Recently used references go to the generator as an avoidance hint. A
//! repeat that slips through is still shown; it is logged, not rejected.

use minion_config::BibleConfig;
use minion_core::digest::{Item, Section};
use minion_core::error::AgentError;
use minion_core::message::Message;
use serde_json::Value;
use tracing::{debug, warn};

use super::FALLBACK_MAX_CHARS;
use crate::context::AgentContext;
use crate::extract::{extract_record, str_field};

/// How many recent references are put in the prompt.
const HINT_REFS: usize = 20;

const USER_PROMPT: &str =
    "One excerpt only; 1-3 verses; spiritually strengthening; no commentary.";

pub async fn run(
    cfg: &BibleConfig,
    heading: &str,
    ctx: &AgentContext,
) -> Result<Section, AgentError> {
    let mut history = ctx.history.load().await;
    let model = cfg
        .model
        .as_deref()
        .unwrap_or(&ctx.settings.default_model);

    let system = format!(
        "Provide a short Bible excerpt suitable for daily meditation, KJV wording (public domain). \
         Return STRICT JSON: {{\"bible\":{{\"reference\":\"Book X:Y-Z\",\"text\":\"...\"}}}}. \
         Avoid repeating any references in this recent list: {}",
        history.recent_bible_refs(HINT_REFS).join(", ")
    );

    let text = ctx
        .generate(
            model,
            vec![Message::system(system), Message::user(USER_PROMPT)],
            false,
        )
        .await?;

    let excerpt = extract_record(&text).and_then(|rec| match rec.get("bible") {
        Some(Value::Object(obj)) => Some(obj.clone()),
        _ => None,
    });

    let Some(excerpt) = excerpt else {
        warn!(heading, "Scripture output had no excerpt object");
        return Ok(fallback(heading, &text));
    };

    let reference = str_field(&excerpt, "reference");
    let verse = str_field(&excerpt, "text");

    if verse.is_empty() {
        warn!(heading, reference, "Scripture excerpt had no text");
        return Ok(fallback(heading, &text));
    }

    if reference.is_empty() {
        return Ok(Section::single(heading, Item::new("Bible", verse)));
    }

    if history.bible_refs.iter().any(|r| r == reference) {
        debug!(heading, reference, "Generator repeated a recent reference");
    }

    history.push_bible_ref(reference);
    if let Err(e) = ctx.history.save(&history).await {
        warn!(heading, error = %e, "Could not record scripture reference");
    }

    Ok(Section::single(
        heading,
        Item::new(reference, format!("{reference} — {verse}")),
    ))
}

fn fallback(heading: &str, raw: &str) -> Section {
    Section::single(heading, Item::fallback("bible", raw, FALLBACK_MAX_CHARS))
}
