//! Keyword scan over retailers' weekly-ad pages.
//!
//! A lightweight complement to the `grocery_prices` live search: it only
//! says that a product appears in an ad, not what it costs.

use minion_config::GroceriesConfig;
use minion_core::digest::{Item, Section};
use minion_core::error::AgentError;
use tracing::{debug, warn};

use crate::context::AgentContext;

const NOTHING_FOUND: &str = "No grocery offers found by simple parser.";

pub async fn run(
    cfg: &GroceriesConfig,
    heading: &str,
    ctx: &AgentContext,
) -> Result<Section, AgentError> {
    let today = ctx.today.format("%Y-%m-%d");
    let mut items = Vec::new();

    for retailer in &cfg.retailers {
        let url = &retailer.url;
        let page = match ctx.fetcher.get_text(url).await {
            Ok(page) => page.to_lowercase(),
            Err(e) => {
                warn!(retailer = %retailer.name, error = %e, "Weekly ad unavailable");
                continue;
            }
        };

        let name = capitalize(&retailer.name);
        for keyword in &cfg.keywords {
            if page.contains(&keyword.to_lowercase()) {
                items.push(Item::new(
                    format!("{keyword} — {name}"),
                    format!(
                        "<strong>{keyword}</strong> appears in {name} weekly ad. \
                         <a href='{url}'>view ad</a> — discovered {today}"
                    ),
                ));
            }
        }
    }

    debug!(heading, found = items.len(), "Grocery scan finished");

    if items.is_empty() {
        items.push(Item::new(heading, NOTHING_FOUND));
    }
    Ok(Section::new(heading, items))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
