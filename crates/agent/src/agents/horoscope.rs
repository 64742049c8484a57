//! Daily horoscope with a one-line weekly hint.
//!
//! The history keeps the date of the last successful reading. A second run
//! on the same date generates a fresh reading anyway; only the marker is
//! stored, never the content.

use minion_config::HoroscopeConfig;
use minion_core::digest::{Item, Section};
use minion_core::error::AgentError;
use minion_core::message::Message;
use serde_json::Value;
use tracing::{debug, warn};

use super::FALLBACK_MAX_CHARS;
use crate::context::AgentContext;
use crate::extract::{extract_record, str_field};

const SYSTEM_PROMPT: &str = "You write a concise daily horoscope with one practical weekly hint. \
Tone: grounded, empowering, no fatalism; 70-120 words daily + one line week hint. \
Return STRICT JSON: {\"horoscope\":{\"daily\":\"...\",\"week\":\"...\"}}.";

pub async fn run(
    cfg: &HoroscopeConfig,
    heading: &str,
    ctx: &AgentContext,
) -> Result<Section, AgentError> {
    let mut history = ctx.history.load().await;
    let today = ctx.today.format("%Y-%m-%d").to_string();
    if history.horoscope_done_on(&today) {
        debug!(heading, date = %today, "Horoscope already generated today, regenerating");
    }

    let model = cfg
        .model
        .as_deref()
        .unwrap_or(&ctx.settings.default_model);
    let profile = &ctx.settings.profile;
    let user = format!("Birth: {}. {}", profile.birth, profile.framing);

    let text = ctx
        .generate(
            model,
            vec![Message::system(SYSTEM_PROMPT), Message::user(user)],
            false,
        )
        .await?;

    let reading = extract_record(&text).and_then(|rec| match rec.get("horoscope") {
        Some(Value::Object(obj)) => Some(obj.clone()),
        _ => None,
    });

    let Some(reading) = reading else {
        warn!(heading, "Horoscope output had no reading object");
        return Ok(fallback(heading, &text));
    };

    let daily = str_field(&reading, "daily");
    let week = str_field(&reading, "week");
    if daily.is_empty() {
        return Ok(fallback(heading, &text));
    }

    history.last_horoscope_date = today;
    if let Err(e) = ctx.history.save(&history).await {
        warn!(heading, error = %e, "Could not record horoscope date");
    }

    let rendered = if week.is_empty() {
        daily.to_string()
    } else {
        format!("{daily}\n  Week: {week}")
    };
    Ok(Section::single(heading, Item::new("Today", rendered)))
}

fn fallback(heading: &str, raw: &str) -> Section {
    Section::single(heading, Item::fallback("horoscope", raw, FALLBACK_MAX_CHARS))
}
