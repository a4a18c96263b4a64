//! Rich-text facet computation
//!
//! Turns plain, unmarked message text into an ordered, non-overlapping
//! list of byte-range annotations ([`Facet`]) over links, mentions, and
//! hashtags, plus the (possibly truncation-rewritten) text those offsets
//! index into.
//!
//! Offsets are computed against the UTF-8 byte sequence of the rewritten
//! text, never character or UTF-16 indices, because the wire protocol
//! indexes by byte. Overlap policy is longest match wins: URL spans are
//! claimed first, and any mention or hashtag candidate overlapping a
//! claimed span is discarded, so a URL containing `@` is never also read
//! as a mention.
//!
//! # Examples
//!
//! ```
//! use crosscast::richtext::detect_facets;
//! use crosscast::types::FacetKind;
//!
//! let (text, facets) = detect_facets("Hello, world! https://example.com");
//! assert_eq!(text, "Hello, world! https://example.com");
//! assert_eq!(facets.len(), 1);
//! assert_eq!(facets[0].byte_start, 14);
//! assert_eq!(facets[0].byte_end, 33);
//! assert_eq!(facets[0].kind, FacetKind::Link);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Facet, FacetKind};

pub mod length;
pub mod resolver;

pub use length::{
    byte_length, char_length, display_length, truncate_url, LengthRule, URL_TRUNCATION_THRESHOLD,
};
pub use resolver::{resolve_mentions, MentionResolver, Resolution};

/// Bare URL token: scheme followed by anything non-whitespace. Trailing
/// punctuation is trimmed after matching.
pub(crate) static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("url pattern is valid"));

/// Mention: `@` plus a handle allowing domain-like suffixes
/// (e.g. `@alice`, `@bob.example.com`). Group 1 is the `@handle` span;
/// the leading alternation enforces a token boundary without lookbehind.
static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[\s(])(@[A-Za-z0-9][A-Za-z0-9.-]*)").expect("mention pattern is valid"));

/// Hashtag: `#` plus a tag that starts with a letter.
static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[\s(])(#[A-Za-z][A-Za-z0-9_]*)").expect("hashtag pattern is valid"));

/// Trim trailing punctuation off a raw URL match.
pub(crate) fn trim_url_match(raw: &str) -> &str {
    raw.trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']', '\'', '"'])
}

/// Trim trailing characters a handle or tag cannot end with.
fn trim_token(raw: &str) -> &str {
    raw.trim_end_matches(['.', '-'])
}

fn overlaps(start: usize, end: usize, claimed: &[(usize, usize)]) -> bool {
    claimed.iter().any(|&(s, e)| start < e && s < end)
}

/// Scan plain text for links, mentions, and hashtags.
///
/// Returns the possibly rewritten text and the facet list, sorted
/// ascending by `byte_start` and mutually non-overlapping. Rewriting
/// happens only via URL truncation: a URL strictly longer than
/// [`URL_TRUNCATION_THRESHOLD`] characters is rendered as its truncated
/// display form, while the facet's `target` keeps the full original URL.
/// Mention facet targets carry the bare handle (without `@`); hashtag
/// targets carry the bare tag (without `#`). Empty text yields an empty
/// facet list.
pub fn detect_facets(text: &str) -> (String, Vec<Facet>) {
    if text.is_empty() {
        return (String::new(), Vec::new());
    }

    // First pass: claim URL spans, rewriting long URLs as we copy. Facet
    // offsets index the rewritten text.
    let mut out = String::with_capacity(text.len());
    let mut facets = Vec::new();
    let mut claimed = Vec::new();
    let mut last = 0;

    for m in URL_RE.find_iter(text) {
        let url = trim_url_match(m.as_str());
        let authority = url.find("://").map(|i| &url[i + 3..]).unwrap_or("");
        if authority.is_empty() {
            continue; // scheme with no authority is not a link
        }
        out.push_str(&text[last..m.start()]);

        let byte_start = out.len();
        match truncate_url(url) {
            Some(display) => out.push_str(&display),
            None => out.push_str(url),
        }
        let byte_end = out.len();

        claimed.push((byte_start, byte_end));
        facets.push(Facet {
            byte_start,
            byte_end,
            kind: FacetKind::Link,
            target: url.to_string(),
        });
        last = m.start() + url.len();
    }
    out.push_str(&text[last..]);

    // Second pass: mentions and hashtags over the rewritten text,
    // discarding candidates that overlap a claimed span.
    for (re, kind) in [(&MENTION_RE, FacetKind::Mention), (&HASHTAG_RE, FacetKind::Hashtag)] {
        for caps in re.captures_iter(&out) {
            let m = caps.get(1).expect("pattern has a capture group");
            let token = trim_token(m.as_str());
            if token.len() < 2 {
                continue; // bare sigil
            }
            let (byte_start, byte_end) = (m.start(), m.start() + token.len());
            if overlaps(byte_start, byte_end, &claimed) {
                continue;
            }
            claimed.push((byte_start, byte_end));
            facets.push(Facet {
                byte_start,
                byte_end,
                kind,
                target: token[1..].to_string(),
            });
        }
    }

    facets.sort_by_key(|f| f.byte_start);
    (out, facets)
}
