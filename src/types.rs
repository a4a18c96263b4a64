//! Core types for Crosscast

use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::error::CrosscastError;

/// A message to broadcast: raw text plus optional image attachments.
#[derive(Debug, Clone, Default)]
pub struct Message {
    pub text: String,
    pub images: Vec<Image>,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            images: Vec::new(),
        }
    }

    pub fn with_images(text: impl Into<String>, images: Vec<Image>) -> Self {
        Self {
            text: text.into(),
            images,
        }
    }
}

/// An image attachment carrying its concrete binary payload.
///
/// Reading image files off disk is a front-end concern; by the time a
/// message reaches this core the bytes must already be present.
#[derive(Debug, Clone)]
pub struct Image {
    pub data: Vec<u8>,
    pub alt: Option<String>,
}

impl Image {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, alt: None }
    }

    pub fn with_alt(data: Vec<u8>, alt: impl Into<String>) -> Self {
        Self {
            data,
            alt: Some(alt.into()),
        }
    }
}

/// Options shared by every platform in one broadcast.
#[derive(Debug, Clone, Default)]
pub struct PostOptions {
    /// Caller-supplied cancellation signal, propagated to every in-flight
    /// network call and mention lookup.
    pub cancel: Option<CancellationToken>,
}

impl PostOptions {
    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            cancel: Some(cancel),
        }
    }
}

/// What kind of span a facet annotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    Link,
    Mention,
    Hashtag,
}

/// A byte-range annotation over post text.
///
/// Offsets index the UTF-8 byte sequence of the (possibly
/// truncation-rewritten) text, not characters or UTF-16 code units,
/// because the wire protocol indexes by byte. `target` always carries the
/// original, untruncated URL or handle even when the displayed text is
/// shortened, and becomes the durable platform identifier after mention
/// resolution.
///
/// Serializes to the external `{byteStart, byteEnd, type, target}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facet {
    pub byte_start: usize,
    pub byte_end: usize,
    #[serde(rename = "type")]
    pub kind: FacetKind,
    pub target: String,
}

/// Outcome of posting to a single platform.
#[derive(Debug)]
pub enum PostOutcome {
    Posted {
        /// Canonical URL derived from the platform response, when the
        /// adapter can compute one.
        url: Option<String>,
        /// The platform's raw response body.
        response: serde_json::Value,
    },
    Failed {
        /// The typed error, so cancellation stays distinguishable from a
        /// network or platform failure.
        error: CrosscastError,
    },
}

/// Per-platform result entry.
///
/// A broadcast returns one of these per input platform, aligned
/// index-for-index with the platform list regardless of completion order.
#[derive(Debug)]
pub struct PostResult {
    /// Stable platform id (e.g. "bluesky").
    pub platform: String,
    pub outcome: PostOutcome,
}

impl PostResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, PostOutcome::Posted { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            &self.outcome,
            PostOutcome::Failed { error } if error.is_cancelled()
        )
    }

    pub fn url(&self) -> Option<&str> {
        match &self.outcome {
            PostOutcome::Posted { url, .. } => url.as_deref(),
            PostOutcome::Failed { .. } => None,
        }
    }

    /// Human-readable failure reason, if this entry failed.
    pub fn reason(&self) -> Option<String> {
        match &self.outcome {
            PostOutcome::Posted { .. } => None,
            PostOutcome::Failed { error } => Some(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_serializes_to_wire_shape() {
        let facet = Facet {
            byte_start: 14,
            byte_end: 33,
            kind: FacetKind::Link,
            target: "https://example.com".to_string(),
        };

        let json = serde_json::to_value(&facet).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "byteStart": 14,
                "byteEnd": 33,
                "type": "link",
                "target": "https://example.com",
            })
        );
    }

    #[test]
    fn test_facet_kind_round_trips() {
        for (kind, name) in [
            (FacetKind::Link, "\"link\""),
            (FacetKind::Mention, "\"mention\""),
            (FacetKind::Hashtag, "\"hashtag\""),
        ] {
            assert_eq!(serde_json::to_string(&kind).unwrap(), name);
            let back: FacetKind = serde_json::from_str(name).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn test_post_result_accessors() {
        let ok = PostResult {
            platform: "bluesky".to_string(),
            outcome: PostOutcome::Posted {
                url: Some("https://bsky.app/profile/x/post/y".to_string()),
                response: serde_json::json!({}),
            },
        };
        assert!(ok.is_success());
        assert!(!ok.is_cancelled());
        assert_eq!(ok.url(), Some("https://bsky.app/profile/x/post/y"));
        assert!(ok.reason().is_none());

        let cancelled = PostResult {
            platform: "bluesky".to_string(),
            outcome: PostOutcome::Failed {
                error: CrosscastError::Cancelled,
            },
        };
        assert!(!cancelled.is_success());
        assert!(cancelled.is_cancelled());
        assert!(cancelled.reason().unwrap().contains("cancelled"));
    }

    #[test]
    fn test_message_constructors() {
        let plain = Message::new("hello");
        assert_eq!(plain.text, "hello");
        assert!(plain.images.is_empty());

        let with_image = Message::with_images("hi", vec![Image::with_alt(vec![1, 2, 3], "a dot")]);
        assert_eq!(with_image.images.len(), 1);
        assert_eq!(with_image.images[0].alt.as_deref(), Some("a dot"));
    }
}
