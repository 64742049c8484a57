//! Digest content types: Items grouped into Sections grouped into a Digest.
//!
//! Invariants kept by the constructors here:
//! - an `Item` always has a non-empty `rendered` body
//! - a `Section` produced by the agent layer always has at least one Item

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const EMPTY_RENDERED: &str = "(no content)";

/// One unit of digest content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,

    /// Display-ready body; may embed markup or `$...$` LaTeX spans
    pub rendered: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Item {
    /// Create an item. An empty body degrades to a placeholder.
    pub fn new(title: impl Into<String>, rendered: impl Into<String>) -> Self {
        let rendered = rendered.into();
        Self {
            title: title.into(),
            rendered: if rendered.trim().is_empty() {
                EMPTY_RENDERED.to_string()
            } else {
                rendered
            },
            image_url: None,
        }
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// A fallback item carrying raw or failed text, title flagged "(fallback)".
    pub fn fallback(label: &str, raw: &str, max_chars: usize) -> Self {
        Self::new(format!("{label} (fallback)"), truncate_chars(raw, max_chars))
    }

    /// Whether the body is usable as-is.
    pub fn is_well_formed(&self) -> bool {
        !self.rendered.trim().is_empty()
    }
}

/// A named, ordered group of Items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub items: Vec<Item>,
}

impl Section {
    pub fn new(heading: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            heading: heading.into(),
            items,
        }
    }

    /// A one-item Section.
    pub fn single(heading: impl Into<String>, item: Item) -> Self {
        Self::new(heading, vec![item])
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The finished digest handed to a delivery channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub title: String,
    pub date: NaiveDate,
    pub sections: Vec<Section>,
}

impl Digest {
    pub fn new(title: impl Into<String>, date: NaiveDate, sections: Vec<Section>) -> Self {
        Self {
            title: title.into(),
            date,
            sections,
        }
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

/// Truncate to at most `max_chars` characters, appending an ellipsis when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}
