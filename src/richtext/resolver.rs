//! Asynchronous mention resolution
//!
//! Mention facets leave the detector carrying the entered handle; a
//! resolver turns each handle into a durable platform identifier (a DID on
//! AT-protocol platforms). A handle that fails to resolve — error,
//! not-found, timeout — drops only that facet: the post proceeds without
//! the annotation and is never aborted over it.

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::cancel::{with_cancel, CancellationToken};
use crate::error::Result;
use crate::types::{Facet, FacetKind};

/// Per-handle lookup outcome.
///
/// Dropping a facet is an expected outcome, not an error, so it travels in
/// the value channel. The error channel is reserved for genuinely
/// exceptional conditions such as total network unavailability
/// ([`crate::error::PlatformError::Resolution`]), which implementations may
/// surface by mapping to `Failed` when they prefer the post to proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Durable identifier the facet target is replaced with.
    Resolved(String),
    /// The platform does not know this handle.
    Unresolved,
    /// The lookup itself failed; the facet is dropped all the same.
    Failed(String),
}

/// Translates an entered handle into a durable platform identifier.
#[async_trait]
pub trait MentionResolver: Send + Sync {
    async fn resolve(&self, handle: &str) -> Resolution;
}

/// Resolve every mention facet in `facets`, dropping the ones that fail.
///
/// Lookups for independent mentions run concurrently with no ordering
/// dependency between them; surviving facets keep their ascending
/// `byte_start` order. Link and hashtag facets pass through untouched. A
/// fired cancellation token rejects the whole pass with
/// [`crate::error::CrosscastError::Cancelled`].
pub async fn resolve_mentions(
    facets: Vec<Facet>,
    resolver: &dyn MentionResolver,
    cancel: Option<&CancellationToken>,
) -> Result<Vec<Facet>> {
    let lookups = facets.into_iter().map(|facet| async move {
        if facet.kind != FacetKind::Mention {
            return Ok(Some(facet));
        }
        let resolution = with_cancel(cancel, async {
            Ok(resolver.resolve(&facet.target).await)
        })
        .await?;
        match resolution {
            Resolution::Resolved(id) => {
                debug!(handle = %facet.target, id = %id, "resolved mention");
                Ok(Some(Facet { target: id, ..facet }))
            }
            Resolution::Unresolved => {
                debug!(handle = %facet.target, "mention did not resolve, dropping facet");
                Ok(None)
            }
            Resolution::Failed(reason) => {
                warn!(handle = %facet.target, %reason, "mention lookup failed, dropping facet");
                Ok(None)
            }
        }
    });

    // join_all keeps input order, so surviving facets stay sorted.
    let resolved: Vec<Result<Option<Facet>>> = join_all(lookups).await;
    let mut out = Vec::new();
    for item in resolved {
        if let Some(facet) = item? {
            out.push(facet);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrosscastError;
    use crate::richtext::detect_facets;
    use std::collections::HashMap;
    use std::time::Duration;

    struct TableResolver {
        table: HashMap<String, String>,
    }

    impl TableResolver {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self {
                table: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl MentionResolver for TableResolver {
        async fn resolve(&self, handle: &str) -> Resolution {
            match self.table.get(handle) {
                Some(id) => Resolution::Resolved(id.clone()),
                None => Resolution::Unresolved,
            }
        }
    }

    struct SlowResolver;

    #[async_trait]
    impl MentionResolver for SlowResolver {
        async fn resolve(&self, _handle: &str) -> Resolution {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Resolution::Unresolved
        }
    }

    #[tokio::test]
    async fn test_resolvable_mentions_get_durable_ids() {
        let (_, facets) = detect_facets("Hello @alice and @bob.example.com!");
        let resolver = TableResolver::new(&[
            ("alice", "did:plc:alice123"),
            ("bob.example.com", "did:plc:bob456"),
        ]);

        let resolved = resolve_mentions(facets, &resolver, None).await.unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].target, "did:plc:alice123");
        assert_eq!(resolved[0].byte_start, 6);
        assert_eq!(resolved[0].byte_end, 12);
        assert_eq!(resolved[1].target, "did:plc:bob456");
        assert_eq!(resolved[1].byte_start, 17);
        assert_eq!(resolved[1].byte_end, 33);
    }

    #[tokio::test]
    async fn test_unresolvable_mention_dropped_without_error() {
        let (_, facets) = detect_facets("Hello @alice and @ghost!");
        let resolver = TableResolver::new(&[("alice", "did:plc:alice123")]);

        let resolved = resolve_mentions(facets, &resolver, None).await.unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].target, "did:plc:alice123");
    }

    #[tokio::test]
    async fn test_failed_lookup_dropped_without_error() {
        struct FailingResolver;

        #[async_trait]
        impl MentionResolver for FailingResolver {
            async fn resolve(&self, _handle: &str) -> Resolution {
                Resolution::Failed("connection reset".to_string())
            }
        }

        let (_, facets) = detect_facets("cc @alice");
        let resolved = resolve_mentions(facets, &FailingResolver, None)
            .await
            .unwrap();
        assert!(resolved.is_empty());
    }

    #[tokio::test]
    async fn test_non_mention_facets_pass_through() {
        let (_, facets) = detect_facets("see https://example.com and #rust, @alice");
        let resolver = TableResolver::new(&[("alice", "did:plc:alice123")]);

        let resolved = resolve_mentions(facets, &resolver, None).await.unwrap();

        assert_eq!(resolved.len(), 3);
        assert!(resolved.iter().any(|f| f.kind == FacetKind::Link
            && f.target == "https://example.com"));
        assert!(resolved
            .iter()
            .any(|f| f.kind == FacetKind::Hashtag && f.target == "rust"));
    }

    #[tokio::test]
    async fn test_surviving_facets_keep_byte_order() {
        let (_, facets) = detect_facets("@zoe then @ghost then @amy then @bob");
        let resolver = TableResolver::new(&[
            ("zoe", "did:plc:zoe"),
            ("amy", "did:plc:amy"),
            ("bob", "did:plc:bob"),
        ]);

        let resolved = resolve_mentions(facets, &resolver, None).await.unwrap();

        assert_eq!(resolved.len(), 3);
        for pair in resolved.windows(2) {
            assert!(pair[0].byte_end <= pair[1].byte_start);
        }
    }

    #[tokio::test]
    async fn test_cancellation_rejects_resolution_pass() {
        let (_, facets) = detect_facets("cc @alice");
        let token = CancellationToken::new();
        token.cancel();

        let result = resolve_mentions(facets, &SlowResolver, Some(&token)).await;
        assert!(matches!(result, Err(CrosscastError::Cancelled)));
    }
}
