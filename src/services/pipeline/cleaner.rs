//! Strips prose and code fences from raw generator output.

use crate::services::generator::ERROR_SENTINEL;

const FENCE: &str = "```";

/// Result of cleaning one raw response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleaned<'a> {
    /// The generator reported an error in-band; the raw text is untouched.
    UpstreamError(&'a str),
    /// Candidate structured text, trimmed, possibly empty.
    Text(&'a str),
}

/// Clean raw generator text.
///
/// The interior of the first fenced block wins; without a fence the whole
/// input is used. A language tag on the opening fence line is dropped.
pub fn clean(raw: &str) -> Cleaned<'_> {
    if raw.trim_start().starts_with(ERROR_SENTINEL) {
        return Cleaned::UpstreamError(raw);
    }

    let Some(start) = raw.find(FENCE) else {
        return Cleaned::Text(raw.trim());
    };

    let after_fence = skip_language_tag(&raw[start + FENCE.len()..]);
    let interior = match after_fence.find(FENCE) {
        Some(end) => &after_fence[..end],
        None => after_fence,
    };
    Cleaned::Text(interior.trim())
}

/// Drop `json`, `JSON`, `c++` etc. directly after the opening fence.
fn skip_language_tag(s: &str) -> &str {
    let tag_len = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-')))
        .unwrap_or(s.len());
    let rest = &s[tag_len..];
    // A tag must be followed by whitespace or the end of input.
    if tag_len > 0 && !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return s;
    }
    rest
}
