//! Practice problems with fingerprint dedup.
//!
//! Each candidate problem is fingerprinted (SHA-256 of the trimmed,
//! lowercased text). A fingerprint already in history, or repeated within
//! the same batch, drops the candidate. The section may come back shorter
//! than requested; it is never padded with repeats.

use minion_config::MathConfig;
use minion_core::digest::{Item, Section};
use minion_core::error::AgentError;
use minion_core::latex;
use minion_core::message::Message;
use serde_json::Value;
use sha2::{Digest as _, Sha256};
use tracing::{debug, warn};

use super::FALLBACK_MAX_CHARS;
use crate::context::AgentContext;
use crate::extract::{extract_record, str_field};

/// How many stored fingerprints are shown to the generator.
const HINT_HASHES: usize = 50;

const SYSTEM_PROMPT: &str = "You generate short math practice tasks for a CS/AI learner. \
Focus on algebra, factoring, linear equations, simple proofs (direct, contrapositive), \
matrix basics (2x2 det, solving small systems), and tiny calculus snippets when helpful. \
Each problem must be concise (one line); write formulas as inline LaTeX between $ signs. \
Return STRICT JSON with keys: {\"math\":[{\"problem\":\"...\",\"tip\":\"...\"}, ...]}. \
Do not repeat any problem semantically; vary structures.";

/// Content fingerprint of a problem statement.
pub fn fingerprint(problem: &str) -> String {
    hex::encode(Sha256::digest(problem.trim().to_lowercase().as_bytes()))
}

pub async fn run(
    cfg: &MathConfig,
    heading: &str,
    ctx: &AgentContext,
) -> Result<Section, AgentError> {
    let mut history = ctx.history.load().await;
    let model = cfg
        .model
        .as_deref()
        .unwrap_or(&ctx.settings.default_model);

    let hints: Vec<&str> = history
        .math_hashes
        .iter()
        .rev()
        .take(HINT_HASHES)
        .map(String::as_str)
        .collect();
    let user = format!(
        "Create {count} distinct problems with a relevant tip each. \
         Target: quick morning practice. Use simple notation. \
         Avoid problems identical (by idea) to earlier ones; past-hash hints: {hints:?}",
        count = cfg.count,
    );

    let text = ctx
        .generate(
            model,
            vec![Message::system(SYSTEM_PROMPT), Message::user(user)],
            false,
        )
        .await?;

    let Some(candidates) = extract_record(&text)
        .and_then(|rec| rec.get("math").and_then(Value::as_array).cloned())
    else {
        warn!(heading, "Math output had no usable problem list");
        return Ok(Section::single(
            heading,
            Item::fallback("math", &text, FALLBACK_MAX_CHARS),
        ));
    };

    let mut items = Vec::new();
    let mut accepted = Vec::new();

    for candidate in candidates.iter().take(cfg.count) {
        let Some(obj) = candidate.as_object() else {
            continue;
        };
        let problem = str_field(obj, "problem");
        if problem.is_empty() {
            continue;
        }

        let hash = fingerprint(problem);
        if history.has_math_hash(&hash) || accepted.contains(&hash) {
            debug!(heading, problem, "Skipping repeated problem");
            continue;
        }

        let tip = str_field(obj, "tip");
        let rendered = if tip.is_empty() {
            problem.to_string()
        } else {
            format!("{problem}\n  Tip: {tip}")
        };

        let mut item = Item::new(problem, rendered);
        if let Some(tex) = latex::first_expression(problem) {
            item = item.with_image(latex::image_url(tex));
        }
        items.push(item);
        accepted.push(hash);
    }

    if !accepted.is_empty() {
        history.push_math_hashes(accepted);
        if let Err(e) = ctx.history.save(&history).await {
            warn!(heading, error = %e, "Could not record math fingerprints");
        }
    }

    Ok(Section::new(heading, items))
}
