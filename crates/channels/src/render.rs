//! Plain-text and HTML renderings of a digest.
//!
//! Item bodies are display-ready and may already carry markup (links,
//! emphasis). HTML output passes that markup through and swaps inline
//! `$...$` math for hosted PNG images; text output strips tags and keeps
//! the math source as written.

use html_escape::{encode_double_quoted_attribute, encode_text};
use minion_core::digest::{Digest, Item};
use minion_core::latex::{self, Segment};
use std::fmt::Write as _;

/// Plain-text digest.
pub fn render_text(digest: &Digest) -> String {
    let mut out = format!("{} — {}\n", digest.title, digest.date.format("%A %d %B %Y"));

    for section in &digest.sections {
        let _ = write!(out, "\n## {}\n", section.heading);
        for item in &section.items {
            let body = strip_tags(&item.rendered);
            match lead(item) {
                Some(title) => {
                    let _ = writeln!(out, "- {title}");
                    for line in body.lines() {
                        let _ = writeln!(out, "  {line}");
                    }
                }
                None => {
                    let mut lines = body.lines();
                    let _ = writeln!(out, "- {}", lines.next().unwrap_or_default());
                    for line in lines {
                        let _ = writeln!(out, "  {line}");
                    }
                }
            }
        }
    }
    out
}

/// Standalone HTML document.
pub fn render_html(digest: &Digest) -> String {
    let title = encode_text(&digest.title);
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body style=\"font-family: sans-serif; max-width: 42em; margin: auto;\">\n\
         <h1>{title}</h1>\n<p><em>{}</em></p>\n",
        digest.date.format("%A %d %B %Y")
    );

    for section in &digest.sections {
        let _ = writeln!(out, "<h2>{}</h2>\n<ul>", encode_text(&section.heading));
        for item in &section.items {
            out.push_str("<li>");
            if let Some(title) = lead(item) {
                let _ = write!(out, "<strong>{}</strong><br>", encode_text(title));
            }
            out.push_str(&body_html(&item.rendered));
            if let Some(url) = &item.image_url
                && latex::first_expression(&item.rendered).is_none()
            {
                let _ = write!(out, "<br><img src=\"{}\" alt=\"\">", encode_double_quoted_attribute(url));
            }
            out.push_str("</li>\n");
        }
        out.push_str("</ul>\n");
    }

    out.push_str("</body></html>\n");
    out
}

/// The title line to show above the body, unless the body already opens with it.
fn lead(item: &Item) -> Option<&str> {
    let title = item.title.trim();
    (!title.is_empty() && !item.rendered.trim_start().starts_with(title)).then_some(title)
}

fn body_html(rendered: &str) -> String {
    latex::segments(rendered)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => text.replace('\n', "<br>\n"),
            Segment::Math(tex) => format!(
                "<img src=\"{}\" alt=\"{}\" style=\"vertical-align: middle;\">",
                encode_double_quoted_attribute(&latex::image_url(tex)),
                encode_double_quoted_attribute(tex)
            ),
        })
        .collect()
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
