//! Two-stage extraction of a structured action from free-form agent text.
//!
//! Stage one pulls the content out of the phase's expected tag pair, stage
//! two finds the `[player N]` reference inside it. Agents routinely emit
//! reasoning preambles containing partial or nested tags, so tag extraction
//! takes the span between the *last* opening and *last* closing tag.

use once_cell::sync::Lazy;
use regex::Regex;
use secret_mafia_lib::PlayerId;

/// Matches `[player N]` or `[N]`, case-insensitive.
static TARGET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[(?:player\s*)?(\d+)\]").expect("valid target regex"));

/// Extract the content between the last `<tag>` and the last `</tag>`,
/// trimmed. Returns `None` if either tag is missing or the last opening tag
/// starts after the last closing tag.
pub(crate) fn extract_tag(text: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");

    let content_start = text.rfind(&open)? + open.len();
    let content_end = text.rfind(&close)?;

    if content_start > content_end {
        return None;
    }

    Some(text[content_start..content_end].trim().to_string())
}

/// Extract the first `[player N]` / `[N]` reference in `content`.
pub(crate) fn extract_target(content: &str) -> Option<PlayerId> {
    let captures = TARGET_RE.captures(content)?;

    captures
        .get(1)
        .expect("regex has one capture group")
        .as_str()
        .parse()
        .ok()
        .map(PlayerId)
}
