//! Web-search-backed generation with structured, freshness-checked results.
//!
//! The generator runs in web-search mode and must return
//! `{"items": [{"title", "summary", "url", "date", ...}]}`. Every item is
//! then checked here, regardless of what the prompt asked for: it needs a
//! non-empty source URL and a date inside the schema's recency window.
//! Items that fail are dropped silently. If nothing survives, the raw
//! backend text is shown as a single fallback item.

use chrono::NaiveDate;
use minion_config::{LiveSearchConfig, SearchSchema};
use minion_core::digest::{Item, Section};
use minion_core::error::AgentError;
use minion_core::message::Message;
use serde_json::Value;
use tracing::{debug, warn};

use super::FALLBACK_MAX_CHARS;
use crate::context::AgentContext;
use crate::extract::{Record, extract_record, str_field};

pub async fn run(
    cfg: &LiveSearchConfig,
    heading: &str,
    ctx: &AgentContext,
) -> Result<Section, AgentError> {
    let model = cfg.model.as_deref().unwrap_or(&ctx.settings.search_model);

    let text = ctx
        .generate(
            model,
            vec![
                Message::system(system_prompt(cfg.schema, ctx.today)),
                Message::user(user_prompt(cfg, heading)),
            ],
            true,
        )
        .await?;

    let candidates = extract_record(&text)
        .and_then(|rec| rec.get("items").and_then(Value::as_array).cloned())
        .unwrap_or_default();
    let offered = candidates.len();

    let items: Vec<Item> = candidates
        .iter()
        .filter_map(Value::as_object)
        .filter(|obj| accept(obj, cfg.schema, ctx.today))
        .take(cfg.limit)
        .map(|obj| render(obj, cfg.schema))
        .collect();

    debug!(
        heading,
        schema = cfg.schema.as_str(),
        offered,
        accepted = items.len(),
        "Live search filtered"
    );

    if items.is_empty() {
        warn!(heading, schema = cfg.schema.as_str(), "No fresh sourced results");
        return Ok(Section::single(
            heading,
            Item::fallback(cfg.schema.as_str(), &text, FALLBACK_MAX_CHARS),
        ));
    }

    Ok(Section::new(heading, items))
}

/// Source URL present and date inside the recency window.
pub fn accept(obj: &Record, schema: SearchSchema, today: NaiveDate) -> bool {
    let url = str_field(obj, "url");
    if url.is_empty() {
        return false;
    }
    match parse_date(str_field(obj, "date")) {
        Some(date) => within_window(date, today, schema.recency_days()),
        None => false,
    }
}

/// `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn within_window(date: NaiveDate, today: NaiveDate, max_age_days: i64) -> bool {
    let age = (today - date).num_days();
    (0..=max_age_days).contains(&age)
}

fn system_prompt(schema: SearchSchema, today: NaiveDate) -> String {
    let fields = match schema {
        SearchSchema::GroceryPrices => {
            "\"title\" (product), \"price\" (with currency), \"store\", \"url\", \"date\""
        }
        SearchSchema::GoodNews => "\"title\", \"summary\" (one or two sentences), \"url\", \"date\"",
        SearchSchema::Studies => {
            "\"title\", \"finding\" (one sentence), \"journal\", \"url\", \"date\" (publication)"
        }
        SearchSchema::Bullets => "\"title\", \"summary\" (one line), \"url\", \"date\"",
    };
    let window = match schema.recency_days() {
        0 => "published today".to_string(),
        n => format!("published within the last {n} days"),
    };

    format!(
        "You research the live web. Today is {today}. Use web search; never answer from memory. \
         Only include results {window}. Every result MUST carry a verifiable source URL and \
         its date as YYYY-MM-DD. Return STRICT JSON: {{\"items\": [{{...}}]}} where each item \
         has {fields}. If nothing qualifies, return {{\"items\": []}}.",
        today = today.format("%Y-%m-%d"),
    )
}

fn user_prompt(cfg: &LiveSearchConfig, heading: &str) -> String {
    let mut parts = Vec::new();
    match cfg.schema {
        SearchSchema::GroceryPrices => parts.push(format!(
            "Find current prices for: {}.",
            if cfg.items.is_empty() {
                heading.to_string()
            } else {
                cfg.items.join(", ")
            }
        )),
        _ => parts.push(format!(
            "Topic: {}.",
            cfg.query.as_deref().unwrap_or(heading)
        )),
    }
    if let (Some(query), SearchSchema::GroceryPrices) = (&cfg.query, cfg.schema) {
        parts.push(format!("Where: {query}."));
    }
    if let Some(purpose) = &cfg.purpose {
        parts.push(format!("Purpose: {purpose}."));
    }
    parts.push(format!("Return at most {} items.", cfg.limit));
    parts.join(" ")
}

fn render(obj: &Record, schema: SearchSchema) -> Item {
    let url = str_field(obj, "url");
    let date = str_field(obj, "date");
    let title = str_field(obj, "title");
    let source = format!("<a href='{url}'>source</a>, {date}");

    let (title, body) = match schema {
        SearchSchema::GroceryPrices => {
            let price = str_field(obj, "price");
            let store = str_field(obj, "store");
            let body = match (price.is_empty(), store.is_empty()) {
                (false, false) => format!("<strong>{price}</strong> at {store}"),
                (false, true) => format!("<strong>{price}</strong>"),
                (true, false) => format!("at {store}"),
                (true, true) => String::new(),
            };
            (title, body)
        }
        SearchSchema::Studies => {
            let finding = str_field(obj, "finding");
            let finding = if finding.is_empty() {
                str_field(obj, "summary")
            } else {
                finding
            };
            let journal = str_field(obj, "journal");
            let body = if journal.is_empty() {
                finding.to_string()
            } else {
                format!("{finding} <em>{journal}</em>")
            };
            (title, body)
        }
        SearchSchema::GoodNews | SearchSchema::Bullets => (title, str_field(obj, "summary").to_string()),
    };

    let title = if title.is_empty() { url } else { title };
    let rendered = if body.is_empty() {
        format!("{title} ({source})")
    } else {
        format!("{title}: {body} ({source})")
    };
    Item::new(title, rendered)
}
