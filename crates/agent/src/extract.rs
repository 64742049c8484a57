//! Structured extraction: recover one JSON object from free-form model text.
//!
//! Generators are asked for strict JSON but routinely wrap it in prose or a
//! code fence, or leave a trailing comma behind. Recovery tries, in order:
//!
//! 1. the inner content of a fenced block (```` ```json ... ``` ````)
//! 2. the whole trimmed text
//! 3. the substring from the first `{` to the last `}`
//! 4. that substring with trailing commas removed
//!
//! Anything else is `None`. Extraction never fails loudly; a `None` means
//! "no usable content" and the caller falls back to showing the raw text.

use regex_lite::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// A recovered JSON object.
pub type Record = Map<String, Value>;

/// Recover a JSON object from `text`, or `None`.
pub fn extract_record(text: &str) -> Option<Record> {
    if let Some(inner) = fenced_block(text)
        && let Some(record) = parse_object(inner)
    {
        return Some(record);
    }

    if let Some(record) = parse_object(text) {
        return Some(record);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    let candidate = &text[start..=end];

    parse_object(candidate).or_else(|| parse_object(&strip_trailing_commas(candidate)))
}

fn parse_object(text: &str) -> Option<Record> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Inner content of the first fenced block, language tag dropped.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    // The info string (e.g. "json") runs to the end of the opening line.
    let body_start = after.find('\n').map_or(0, |i| i + 1);
    let body = &after[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

/// Remove commas that directly precede a closing brace or bracket.
fn strip_trailing_commas(text: &str) -> String {
    static TRAILING_COMMA: OnceLock<Regex> = OnceLock::new();
    let re = TRAILING_COMMA.get_or_init(|| Regex::new(r",\s*([}\]])").expect("valid regex"));
    re.replace_all(text, "$1").into_owned()
}

/// A trimmed string field, empty when absent or not a string.
pub fn str_field<'a>(record: &'a Record, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).map_or("", str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json() {
        let rec = extract_record(r#"{"bible": {"reference": "John 3:16"}}"#).unwrap();
        assert_eq!(rec["bible"]["reference"], "John 3:16");
    }

    #[test]
    fn fenced_json_with_language_tag() {
        let text = "Here you go:\n```json\n{\"math\": [{\"problem\": \"2x = 4\"}]}\n```\nEnjoy!";
        let rec = extract_record(text).unwrap();
        assert_eq!(rec["math"][0]["problem"], "2x = 4");
    }

    #[test]
    fn fenced_without_tag() {
        let rec = extract_record("```\n{\"a\": 1}\n```").unwrap();
        assert_eq!(rec["a"], 1);
    }

    #[test]
    fn broken_fence_falls_through_to_braces() {
        // The fence holds garbage, the real object sits after it.
        let text = "```\nnot json\n```\nActual: {\"ok\": true}";
        let rec = extract_record(text).unwrap();
        assert_eq!(rec["ok"], true);
    }

    #[test]
    fn object_embedded_in_prose() {
        let text = "Sure! The answer is {\"horoscope\": {\"daily\": \"Rest.\"}} Hope it helps.";
        let rec = extract_record(text).unwrap();
        assert_eq!(rec["horoscope"]["daily"], "Rest.");
    }

    #[test]
    fn trailing_commas_repaired() {
        let text = "Result:\n{\"math\": [{\"problem\": \"x+1=2\", \"tip\": \"subtract\",},],}\nDone.";
        let rec = extract_record(text).unwrap();
        assert_eq!(rec["math"][0]["tip"], "subtract");
    }

    #[test]
    fn unrecoverable_is_none() {
        assert!(extract_record("").is_none());
        assert!(extract_record("I could not find anything today.").is_none());
        assert!(extract_record("{ broken: yes").is_none());
        assert!(extract_record("} backwards {").is_none());
        assert!(extract_record("{\"a\": [1, 2}").is_none());
    }

    #[test]
    fn non_object_json_is_none() {
        assert!(extract_record("[1, 2, 3]").is_none());
        assert!(extract_record("\"just a string\"").is_none());
    }

    #[test]
    fn str_field_trims_and_defaults() {
        let rec = extract_record(r#"{"a": "  x  ", "b": 3}"#).unwrap();
        assert_eq!(str_field(&rec, "a"), "x");
        assert_eq!(str_field(&rec, "b"), "");
        assert_eq!(str_field(&rec, "missing"), "");
    }
}
