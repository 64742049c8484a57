//! Topic file — the declarative description of a digest.
//!
//! ```toml
//! [defaults]
//! max_items_per_section = 5
//!
//! [[topics]]
//! heading = "Morning math"
//! [[topics.agents]]
//! type = "llm_math"
//! count = 2
//! ```
//!
//! Agent entries are parsed into the closed [`AgentSpec`] sum type. An entry
//! whose `type` is unknown, or whose options do not fit its type, is kept as
//! [`AgentSpec::Unknown`] / [`AgentSpec::Invalid`] so the run can report it
//! as a diagnostic section instead of refusing the whole file.

use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::ConfigError;

/// The whole topic file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicsFile {
    #[serde(default)]
    pub defaults: TopicDefaults,

    #[serde(default)]
    pub topics: Vec<TopicSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicDefaults {
    #[serde(default = "default_max_items")]
    pub max_items_per_section: usize,
}

fn default_max_items() -> usize {
    5
}

impl Default for TopicDefaults {
    fn default() -> Self {
        Self {
            max_items_per_section: default_max_items(),
        }
    }
}

/// One digest section's worth of agents.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicSpec {
    pub heading: String,

    #[serde(default)]
    pub agents: Vec<AgentSpec>,

    /// Per-topic override of `defaults.max_items_per_section`
    #[serde(default)]
    pub max_items_per_section: Option<usize>,
}

impl TopicSpec {
    /// The effective item cap for this topic.
    pub fn cap(&self, defaults: &TopicDefaults) -> usize {
        self.max_items_per_section
            .unwrap_or(defaults.max_items_per_section)
    }
}

impl TopicsFile {
    /// Load a topic file; `.yaml`/`.yml` is read as YAML, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let parsed = if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_toml_str(&content)
        };

        parsed.map_err(|reason| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        let file: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        file.validate()?;
        Ok(file)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, String> {
        let file: Self = serde_yaml_ng::from_str(content).map_err(|e| e.to_string())?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<(), String> {
        if self.defaults.max_items_per_section == 0 {
            return Err("defaults.max_items_per_section must be at least 1".into());
        }
        for topic in &self.topics {
            if topic.max_items_per_section == Some(0) {
                return Err(format!(
                    "topic '{}': max_items_per_section must be at least 1",
                    topic.heading
                ));
            }
        }
        Ok(())
    }

    /// Every agent entry that will surface as a diagnostic, with its topic.
    pub fn problems(&self) -> Vec<(&str, &AgentSpec)> {
        self.topics
            .iter()
            .flat_map(|t| t.agents.iter().map(move |a| (t.heading.as_str(), a)))
            .filter(|(_, a)| !a.is_runnable())
            .collect()
    }
}

/// A single agent entry, one variant per content kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentSpec {
    Math(MathConfig),
    Bible(BibleConfig),
    Horoscope(HoroscopeConfig),
    LiveSearch(LiveSearchConfig),
    WebSearch(WebSearchConfig),
    Groceries(GroceriesConfig),
    /// `type` missing or not one of the known kinds
    Unknown { type_name: String },
    /// Known `type`, but its options did not parse
    Invalid { type_name: String, reason: String },
}

impl AgentSpec {
    /// The `type` string as written in the topic file.
    pub fn type_name(&self) -> &str {
        match self {
            AgentSpec::Math(_) => "llm_math",
            AgentSpec::Bible(_) => "llm_bible",
            AgentSpec::Horoscope(_) => "llm_horoscope",
            AgentSpec::LiveSearch(_) => "llm_search",
            AgentSpec::WebSearch(_) => "search",
            AgentSpec::Groceries(_) => "groceries",
            AgentSpec::Unknown { type_name } | AgentSpec::Invalid { type_name, .. } => type_name,
        }
    }

    pub fn is_runnable(&self) -> bool {
        !matches!(self, AgentSpec::Unknown { .. } | AgentSpec::Invalid { .. })
    }

    /// Classify a raw mapping by its `type` key.
    pub fn from_value(value: serde_json::Value) -> Self {
        let type_name = match value.get("type").and_then(|t| t.as_str()) {
            Some(t) => t.to_string(),
            None => {
                return AgentSpec::Unknown {
                    type_name: "<missing>".into(),
                };
            }
        };

        fn parse<T: serde::de::DeserializeOwned>(
            type_name: &str,
            value: serde_json::Value,
            wrap: fn(T) -> AgentSpec,
        ) -> AgentSpec {
            match serde_json::from_value::<T>(value) {
                Ok(cfg) => wrap(cfg),
                Err(e) => AgentSpec::Invalid {
                    type_name: type_name.to_string(),
                    reason: e.to_string(),
                },
            }
        }

        match type_name.as_str() {
            "llm_math" => parse(&type_name, value, AgentSpec::Math),
            "llm_bible" => parse(&type_name, value, AgentSpec::Bible),
            "llm_horoscope" => parse(&type_name, value, AgentSpec::Horoscope),
            "llm_search" => parse(&type_name, value, AgentSpec::LiveSearch),
            "search" => parse(&type_name, value, AgentSpec::WebSearch),
            "groceries" => parse(&type_name, value, AgentSpec::Groceries),
            _ => AgentSpec::Unknown { type_name },
        }
    }
}

impl<'de> Deserialize<'de> for AgentSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(AgentSpec::from_value(value))
    }
}

/// `type = "llm_math"`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MathConfig {
    #[serde(default = "default_math_count")]
    pub count: usize,
    #[serde(default)]
    pub model: Option<String>,
}

fn default_math_count() -> usize {
    2
}

/// `type = "llm_bible"`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BibleConfig {
    #[serde(default)]
    pub model: Option<String>,
}

/// `type = "llm_horoscope"`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HoroscopeConfig {
    #[serde(default)]
    pub model: Option<String>,
}

/// Output schema of a live-search agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSchema {
    /// Current prices for a shopping list
    #[serde(alias = "groceries")]
    GroceryPrices,
    /// Uplifting news on a topic
    #[serde(alias = "news")]
    GoodNews,
    /// Recent study citations
    #[serde(alias = "study")]
    Studies,
    /// General-purpose bullet points
    #[serde(alias = "general")]
    Bullets,
}

impl SearchSchema {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSchema::GroceryPrices => "grocery_prices",
            SearchSchema::GoodNews => "good_news",
            SearchSchema::Studies => "studies",
            SearchSchema::Bullets => "bullets",
        }
    }

    /// Maximum age in days of an accepted result; 0 means same-day only.
    pub fn recency_days(&self) -> i64 {
        match self {
            SearchSchema::GroceryPrices => 7,
            SearchSchema::GoodNews => 3,
            SearchSchema::Studies => 7,
            SearchSchema::Bullets => 0,
        }
    }
}

/// `type = "llm_search"`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LiveSearchConfig {
    pub schema: SearchSchema,

    /// What to search for (topic, region, question)
    #[serde(default)]
    pub query: Option<String>,

    /// Why the reader wants this, passed to the generator as framing
    #[serde(default)]
    pub purpose: Option<String>,

    /// Explicit list (e.g. the grocery shopping list)
    #[serde(default)]
    pub items: Vec<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// `type = "search"`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebSearchConfig {
    pub query: String,

    #[serde(default = "default_limit")]
    pub max_results: usize,

    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Item template with `{title}`, `{url}`, `{summary}`
    #[serde(default = "default_render")]
    pub render: String,

    #[serde(default)]
    pub allow_domains: Vec<String>,

    #[serde(default)]
    pub deny_domains: Vec<String>,
}

fn default_limit() -> usize {
    5
}

fn default_render() -> String {
    "{title} — {url}".into()
}

/// `type = "groceries"`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroceriesConfig {
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Scanned in the order listed
    #[serde(default = "default_retailers")]
    pub retailers: Vec<Retailer>,
}

/// A shop and its weekly-ad page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Retailer {
    pub name: String,
    pub url: String,
}

fn default_keywords() -> Vec<String> {
    [
        "æg",
        "hakket oksekød",
        "græsk yoghurt",
        "blåbær",
        "søde kartofler",
        "sødekartofler",
        "hytteost",
        "peanut butter",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_retailers() -> Vec<Retailer> {
    [
        ("netto", "https://netto.dk/tilbudsavis/"),
        ("rema1000", "https://rema1000.dk/tilbudsavis/"),
        ("lidl", "https://www.lidl.dk/tilbudsavis"),
        ("coop", "https://coop.dk/tilbudsavis"),
        ("bilka", "https://www.bilka.dk/tilbudsavis"),
    ]
    .into_iter()
    .map(|(name, url)| Retailer {
        name: name.into(),
        url: url.into(),
    })
    .collect()
}
