//! Display-length and byte-offset accounting
//!
//! Two distinct measures apply to post text. Display length counts Unicode
//! scalar values, matching platform-documented counting rules, so an emoji
//! counts as one. Byte offsets index the UTF-8 encoding, because facet
//! spans are wire-indexed in bytes and non-ASCII text shifts the two
//! measures apart.

use super::URL_RE;

/// Character length above which a bare URL is rendered truncated.
///
/// A URL of exactly this length is NOT truncated; only strictly longer
/// ones are.
pub const URL_TRUNCATION_THRESHOLD: usize = 27;

/// Ellipsis marker appended to a truncated URL.
pub const ELLIPSIS: &str = "...";

/// Length in Unicode scalar values.
pub fn char_length(text: &str) -> usize {
    text.chars().count()
}

/// Length in UTF-8 bytes.
pub fn byte_length(text: &str) -> usize {
    text.len()
}

/// Truncated display rendering of a URL, or `None` if it fits.
///
/// The rendering is the URL's first `threshold - 3` characters plus a
/// 3-character ellipsis marker: exactly [`URL_TRUNCATION_THRESHOLD`]
/// characters in total.
pub fn truncate_url(url: &str) -> Option<String> {
    if char_length(url) <= URL_TRUNCATION_THRESHOLD {
        return None;
    }
    let mut display: String = url
        .chars()
        .take(URL_TRUNCATION_THRESHOLD - ELLIPSIS.len())
        .collect();
    display.push_str(ELLIPSIS);
    Some(display)
}

/// Display length of post text: Unicode scalars, with each bare URL
/// counted as its (possibly truncated) rendered appearance.
pub fn display_length(text: &str) -> usize {
    let mut total = 0;
    let mut last = 0;
    for m in URL_RE.find_iter(text) {
        let url = super::trim_url_match(m.as_str());
        let end = m.start() + url.len();
        total += char_length(&text[last..m.start()]);
        total += char_length(url).min(URL_TRUNCATION_THRESHOLD);
        last = end;
    }
    total += char_length(&text[last..]);
    total
}

/// Per-platform counting rule, part of each adapter's descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthRule {
    /// Count Unicode scalar values (most platforms document this).
    UnicodeScalars,
    /// Count UTF-8 bytes.
    Utf8Bytes,
}

impl LengthRule {
    pub fn measure(&self, text: &str) -> usize {
        match self {
            LengthRule::UnicodeScalars => char_length(text),
            LengthRule::Utf8Bytes => byte_length(text),
        }
    }
}
