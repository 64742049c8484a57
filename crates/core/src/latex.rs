//! Inline `$...$` LaTeX spans and their hosted PNG renderings.

const CODECOGS_URL: &str = "https://latex.codecogs.com/png.latex?";
const RENDER_PREFIX: &str = r"\dpi{120} \normalsize ";

/// A piece of text split around inline math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Math(&'a str),
}

/// Split text into plain and `$...$` segments.
///
/// A span never crosses a line break and must be non-empty; an unmatched
/// `$` stays in the surrounding text.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(rel) = text[cursor..].find('$') {
        let open = cursor + rel;
        let body_start = open + 1;
        let line_end = text[body_start..]
            .find('\n')
            .map_or(text.len(), |i| body_start + i);

        match text[body_start..line_end].find('$') {
            Some(len) if len > 0 => {
                if open > plain_start {
                    out.push(Segment::Text(&text[plain_start..open]));
                }
                out.push(Segment::Math(&text[body_start..body_start + len]));
                cursor = body_start + len + 1;
                plain_start = cursor;
            }
            _ => cursor = body_start,
        }
    }

    if plain_start < text.len() {
        out.push(Segment::Text(&text[plain_start..]));
    }
    out
}

/// The first inline math expression, if any.
pub fn first_expression(text: &str) -> Option<&str> {
    segments(text).into_iter().find_map(|s| match s {
        Segment::Math(tex) => Some(tex),
        Segment::Text(_) => None,
    })
}

/// URL of a PNG rendering of `tex`.
pub fn image_url(tex: &str) -> String {
    format!(
        "{CODECOGS_URL}{}",
        urlencoding::encode(&format!("{RENDER_PREFIX}{}", tex.trim()))
    )
}
