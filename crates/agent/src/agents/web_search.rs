//! Plain web search: DuckDuckGo related topics, then a title and blurb per page.

use minion_config::WebSearchConfig;
use minion_core::digest::{Item, Section, truncate_chars};
use minion_core::error::AgentError;
use regex_lite::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::context::AgentContext;

const DDG_ENDPOINT: &str = "https://api.duckduckgo.com/";
const SUMMARY_MAX_CHARS: usize = 220;
const PARAGRAPH_MIN: usize = 60;
const PARAGRAPH_MAX: usize = 240;

pub async fn run(
    cfg: &WebSearchConfig,
    heading: &str,
    ctx: &AgentContext,
) -> Result<Section, AgentError> {
    let api_url = format!(
        "{DDG_ENDPOINT}?q={}&format=json&no_html=1&skip_disambig=1",
        urlencoding::encode(&cfg.query)
    );
    let body = ctx.fetcher.get_text(&api_url).await?;
    let payload: Value = serde_json::from_str(&body).map_err(|e| AgentError::Http {
        url: api_url.clone(),
        reason: format!("invalid search response: {e}"),
    })?;

    let urls = result_urls(&payload, cfg.max_results);
    debug!(heading, query = %cfg.query, found = urls.len(), "Search results");

    let mut items = Vec::new();
    let mut fetched_any = false;
    for url in urls {
        if items.len() >= cfg.limit {
            break;
        }
        let Some(host) = host_of(&url) else {
            continue;
        };
        if !domain_allowed(&host, &cfg.allow_domains, &cfg.deny_domains) {
            continue;
        }

        if fetched_any && !ctx.settings.fetch_delay.is_zero() {
            tokio::time::sleep(ctx.settings.fetch_delay).await;
        }
        fetched_any = true;

        let page = match ctx.fetcher.get_text(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %url, error = %e, "Skipping unreachable search result");
                continue;
            }
        };

        let title = page_title(&page).unwrap_or_else(|| host.clone());
        let summary = page_summary(&page).unwrap_or_default();
        let rendered = cfg
            .render
            .replace("{title}", &title)
            .replace("{url}", &url)
            .replace("{summary}", &summary);
        items.push(Item::new(title, rendered));
    }

    if items.is_empty() {
        items.push(Item::new(heading, format!("No results for \"{}\".", cfg.query)));
    }
    Ok(Section::new(heading, items))
}

/// `RelatedTopics[].FirstURL`, in order, at most `max`.
fn result_urls(payload: &Value, max: usize) -> Vec<String> {
    payload
        .get("RelatedTopics")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|topic| topic.get("FirstURL").and_then(Value::as_str))
        .take(max)
        .map(String::from)
        .collect()
}

/// Lowercased host of an absolute URL.
fn host_of(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    parsed.host_str().map(str::to_lowercase)
}

/// Suffix match; an empty allow list allows everything.
fn domain_allowed(host: &str, allow: &[String], deny: &[String]) -> bool {
    let matches = |d: &String| host.ends_with(&d.to_lowercase());
    (allow.is_empty() || allow.iter().any(matches)) && !deny.iter().any(matches)
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid regex"))
}

fn page_title(html: &str) -> Option<String> {
    static TITLE: OnceLock<Regex> = OnceLock::new();
    let title = regex(&TITLE, r"(?is)<title[^>]*>(.*?)</title>")
        .captures(html)
        .map(|c| clean_text(&c[1]))
        .filter(|t| !t.is_empty());

    title.or_else(|| meta_content(html, &["og:title", "title"]))
}

fn page_summary(html: &str) -> Option<String> {
    static PARAGRAPH: OnceLock<Regex> = OnceLock::new();

    let summary = meta_content(html, &["description", "og:description"]).or_else(|| {
        regex(&PARAGRAPH, r"(?is)<p(?:\s[^>]*)?>(.*?)</p>")
            .captures_iter(html)
            .map(|c| clean_text(&c[1]))
            .find(|p| (PARAGRAPH_MIN..=PARAGRAPH_MAX).contains(&p.chars().count()))
    })?;

    Some(truncate_chars(&summary, SUMMARY_MAX_CHARS))
}

/// Content of the first `<meta>` whose `name` or `property` is one of `keys`,
/// trying the keys in order.
fn meta_content(html: &str, keys: &[&str]) -> Option<String> {
    static META: OnceLock<Regex> = OnceLock::new();
    static KEY: OnceLock<Regex> = OnceLock::new();
    static CONTENT: OnceLock<Regex> = OnceLock::new();

    let tags: Vec<&str> = regex(&META, r"(?is)<meta\s[^>]*>")
        .find_iter(html)
        .map(|m| m.as_str())
        .collect();
    let key_re = regex(&KEY, r#"(?i)\b(?:name|property)\s*=\s*["']([^"']+)["']"#);
    let content_re = regex(&CONTENT, r#"(?i)\bcontent\s*=\s*["']([^"']*)["']"#);

    keys.iter().find_map(|key| {
        tags.iter().find_map(|tag| {
            let name = key_re.captures(tag)?;
            if !name[1].eq_ignore_ascii_case(key) {
                return None;
            }
            let content = clean_text(&content_re.captures(tag)?[1]);
            (!content.is_empty()).then_some(content)
        })
    })
}

/// Strip tags, decode entities, collapse whitespace.
fn clean_text(fragment: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let text = regex(&TAG, r"<[^>]+>").replace_all(fragment, " ");
    html_escape::decode_html_entities(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use minion_memory::InMemoryHistory;
    use std::sync::Arc;

    const ARTICLE: &str = r#"<html><head>
<title>  Solar  &amp; Wind Hit Record </title>
<meta property="og:description" content="Renewables passed coal for the first time.">
</head><body><p>short</p></body></html>"#;

    const BARE: &str = r#"<html><head>
<meta content="Meta Title" name="title">
</head><body>
<p>Too short.</p>
<p>This paragraph is long enough to serve as a summary for the page, it really is.</p>
</body></html>"#;

    fn cfg() -> WebSearchConfig {
        WebSearchConfig {
            query: "renewables record".into(),
            max_results: 5,
            limit: 5,
            render: "{title} — {url} — {summary}".into(),
            allow_domains: vec![],
            deny_domains: vec![],
        }
    }

    fn ddg_url(query: &str) -> String {
        format!(
            "{DDG_ENDPOINT}?q={}&format=json&no_html=1&skip_disambig=1",
            urlencoding::encode(query)
        )
    }

    fn ddg_payload(urls: &[&str]) -> String {
        let topics: Vec<Value> = urls
            .iter()
            .map(|u| serde_json::json!({"FirstURL": u, "Text": "t"}))
            .chain(std::iter::once(serde_json::json!({"Name": "group", "Topics": []})))
            .collect();
        serde_json::json!({"RelatedTopics": topics}).to_string()
    }

    #[test]
    fn host_parsing() {
        assert_eq!(host_of("https://News.Example.com/a?b").as_deref(), Some("news.example.com"));
        assert_eq!(host_of("http://user@host.io:8080/").as_deref(), Some("host.io"));
        assert_eq!(host_of("http://[::1]:8080/page").as_deref(), Some("[::1]"));
        assert_eq!(host_of("not a url"), None);
    }

    #[test]
    fn domain_filters() {
        let allow = vec!["example.com".to_string()];
        let deny = vec!["spam.example.com".to_string()];
        assert!(domain_allowed("news.example.com", &allow, &deny));
        assert!(!domain_allowed("spam.example.com", &allow, &deny));
        assert!(!domain_allowed("other.org", &allow, &deny));
        assert!(domain_allowed("other.org", &[], &[]));
    }

    #[test]
    fn title_and_meta_description() {
        assert_eq!(page_title(ARTICLE).as_deref(), Some("Solar & Wind Hit Record"));
        assert_eq!(
            page_summary(ARTICLE).as_deref(),
            Some("Renewables passed coal for the first time.")
        );
    }

    #[test]
    fn numeric_and_named_entities_decoded() {
        assert_eq!(
            page_title("<title>It&#8217;s a &hellip; day &#x27;ok&#x27;</title>").as_deref(),
            Some("It’s a … day 'ok'")
        );
        let meta = r#"<meta name="description" content="Caf&eacute;&nbsp;prices &mdash; up&#160;3%">"#;
        assert_eq!(page_summary(meta).as_deref(), Some("Café prices — up 3%"));
    }

    #[test]
    fn meta_title_and_paragraph_fallbacks() {
        assert_eq!(page_title(BARE).as_deref(), Some("Meta Title"));
        let summary = page_summary(BARE).unwrap();
        assert!(summary.starts_with("This paragraph is long enough"));
    }

    #[test]
    fn long_summary_truncated() {
        let long = format!(r#"<meta name="description" content="{}">"#, "word ".repeat(100));
        let summary = page_summary(&long).unwrap();
        assert_eq!(summary.chars().count(), SUMMARY_MAX_CHARS);
        assert!(summary.ends_with('…'));
    }

    #[tokio::test]
    async fn renders_results_and_skips_failures() {
        let fetcher = Arc::new(
            MockFetcher::default()
                .with_page(
                    &ddg_url("renewables record"),
                    &ddg_payload(&[
                        "https://news.example.com/solar",
                        "https://down.example.org/",
                        "https://blog.example.net/post",
                    ]),
                )
                .with_page("https://news.example.com/solar", ARTICLE)
                .with_page("https://blog.example.net/post", BARE),
        );
        let provider = Arc::new(SequentialMockProvider::new(vec![]));
        let ctx = test_context_with_fetcher(provider, Arc::new(InMemoryHistory::new()), fetcher.clone());

        let section = run(&cfg(), "Energy", &ctx).await.unwrap();

        assert_eq!(section.items.len(), 2);
        assert_eq!(
            section.items[0].rendered,
            "Solar & Wind Hit Record — https://news.example.com/solar — Renewables passed coal for the first time."
        );
        assert_eq!(section.items[1].title, "Meta Title");
        assert_eq!(fetcher.fetched().len(), 4);
    }

    #[tokio::test]
    async fn deny_list_and_limit_respected() {
        let fetcher = Arc::new(
            MockFetcher::default()
                .with_page(
                    &ddg_url("renewables record"),
                    &ddg_payload(&[
                        "https://ads.spam.com/x",
                        "https://a.example.com/1",
                        "https://b.example.com/2",
                    ]),
                )
                .with_page("https://a.example.com/1", ARTICLE)
                .with_page("https://b.example.com/2", ARTICLE),
        );
        let provider = Arc::new(SequentialMockProvider::new(vec![]));
        let ctx = test_context_with_fetcher(provider, Arc::new(InMemoryHistory::new()), fetcher.clone());
        let mut config = cfg();
        config.deny_domains = vec!["spam.com".into()];
        config.limit = 1;

        let section = run(&config, "Energy", &ctx).await.unwrap();
        assert_eq!(section.items.len(), 1);
        assert!(!fetcher.fetched().iter().any(|u| u.contains("spam.com")));
        assert!(!fetcher.fetched().iter().any(|u| u.contains("b.example.com")));
    }

    #[tokio::test]
    async fn no_results_gives_placeholder() {
        let fetcher = Arc::new(
            MockFetcher::default().with_page(&ddg_url("renewables record"), r#"{"RelatedTopics": []}"#),
        );
        let provider = Arc::new(SequentialMockProvider::new(vec![]));
        let ctx = test_context_with_fetcher(provider, Arc::new(InMemoryHistory::new()), fetcher);

        let section = run(&cfg(), "Energy", &ctx).await.unwrap();
        assert_eq!(section.items.len(), 1);
        assert!(section.items[0].rendered.contains("No results"));
    }

    #[tokio::test]
    async fn search_api_failure_is_an_error() {
        let provider = Arc::new(SequentialMockProvider::new(vec![]));
        let ctx = test_context(provider, Arc::new(InMemoryHistory::new()));
        assert!(matches!(
            run(&cfg(), "Energy", &ctx).await,
            Err(AgentError::Http { .. })
        ));
    }
}
