//! End-to-end tests for the broadcast fan-out and the rich-text pipeline,
//! driven by the mock platform and an in-memory mention resolver.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use crosscast::cancel::CancellationToken;
use crosscast::platforms::mock::MockPlatform;
use crosscast::platforms::Platform;
use crosscast::richtext::{
    byte_length, detect_facets, resolve_mentions, MentionResolver, Resolution,
};
use crosscast::types::{FacetKind, Message, PostOptions};
use crosscast::Broadcaster;

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

#[tokio::test]
async fn broadcast_output_aligns_with_input_for_any_interleaving() {
    // Completion order is reversed from input order: the first platform
    // is the slowest. The output must still mirror input order.
    let platforms: Vec<Box<dyn Platform>> = vec![
        Box::new(MockPlatform::with_delay("slowest", Duration::from_millis(120))),
        Box::new(MockPlatform::with_delay("middle", Duration::from_millis(60))),
        Box::new(MockPlatform::success("fastest")),
    ];
    let broadcaster = Broadcaster::new(platforms);

    let results = broadcaster
        .broadcast(&Message::new("ordering test"), &PostOptions::default())
        .await;

    let ids: Vec<&str> = results.iter().map(|r| r.platform.as_str()).collect();
    assert_eq!(ids, ["slowest", "middle", "fastest"]);
}

#[tokio::test]
async fn forced_mid_list_failure_leaves_neighbors_untouched() {
    let ok_before = MockPlatform::success("before");
    let ok_after = MockPlatform::success("after");
    let (before_calls, _) = ok_before.counters();
    let (after_calls, _) = ok_after.counters();

    let platforms: Vec<Box<dyn Platform>> = vec![
        Box::new(ok_before),
        Box::new(MockPlatform::post_failure("failing", "server exploded")),
        Box::new(ok_after),
    ];
    let broadcaster = Broadcaster::new(platforms);

    let results = broadcaster
        .broadcast(&Message::new("partial failure"), &PostOptions::default())
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_success());
    assert!(!results[1].is_success());
    assert!(results[2].is_success());
    assert_eq!(*before_calls.lock().unwrap(), 1);
    assert_eq!(*after_calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn cancellation_mid_flight_rejects_with_cancellation_typed_error() {
    let platforms: Vec<Box<dyn Platform>> = vec![
        Box::new(MockPlatform::with_delay("hung", Duration::from_secs(60))),
    ];
    let broadcaster = Broadcaster::new(platforms);

    let token = CancellationToken::new();
    let fired = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(25)).await;
        fired.cancel();
    });

    let start = std::time::Instant::now();
    let results = broadcaster
        .broadcast(&Message::new("doomed"), &PostOptions::with_cancel(token))
        .await;

    assert!(start.elapsed() < Duration::from_secs(5), "did not reject promptly");
    assert_eq!(results.len(), 1);
    assert!(results[0].is_cancelled(), "got: {:?}", results[0].reason());
}

#[tokio::test]
async fn pipeline_resolves_one_mention_and_drops_the_other() {
    let (text, facets) = detect_facets("ping @known.example.com and @unknown");
    let resolver = TableResolver::new(&[("known.example.com", "did:plc:known1")]);

    let facets = resolve_mentions(facets, &resolver, None).await.unwrap();

    assert_eq!(facets.len(), 1);
    assert_eq!(facets[0].kind, FacetKind::Mention);
    assert_eq!(facets[0].target, "did:plc:known1");
    assert_eq!(&text[facets[0].byte_start..facets[0].byte_end], "@known.example.com");

    // The post itself still goes out.
    let broadcaster = Broadcaster::new(vec![
        Box::new(MockPlatform::success("mock")) as Box<dyn Platform>,
    ]);
    let results = broadcaster
        .broadcast(&Message::new(text), &PostOptions::default())
        .await;
    assert!(results[0].is_success());
}

#[tokio::test]
async fn pipeline_offsets_stay_byte_accurate_through_resolution() {
    let input = "héllo 👍 @alice and https://example.com/a/rather/long/path #tag";
    let (text, facets) = detect_facets(input);
    let resolver = TableResolver::new(&[("alice", "did:plc:alice123")]);
    let facets = resolve_mentions(facets, &resolver, None).await.unwrap();

    for pair in facets.windows(2) {
        assert!(pair[0].byte_end <= pair[1].byte_start);
    }
    for facet in &facets {
        assert!(facet.byte_start < facet.byte_end);
        assert!(facet.byte_end <= byte_length(&text));
        assert!(text.is_char_boundary(facet.byte_start));
        assert!(text.is_char_boundary(facet.byte_end));
    }

    let link = facets.iter().find(|f| f.kind == FacetKind::Link).unwrap();
    assert_eq!(link.target, "https://example.com/a/rather/long/path");
    assert!(text[link.byte_start..link.byte_end].ends_with("..."));
}

#[tokio::test]
async fn every_platform_sees_exactly_the_broadcast_text() {
    let first = MockPlatform::success("first");
    let second = MockPlatform::success("second");
    let (_, first_posts) = first.counters();
    let (_, second_posts) = second.counters();

    let broadcaster = Broadcaster::new(vec![
        Box::new(first) as Box<dyn Platform>,
        Box::new(second) as Box<dyn Platform>,
    ]);

    let (text, _) = detect_facets("see https://example.com/a/rather/long/path for details");
    broadcaster
        .broadcast(&Message::new(text.clone()), &PostOptions::default())
        .await;

    // The text measured for truncation is exactly the text transmitted.
    assert_eq!(*first_posts.lock().unwrap(), vec![text.clone()]);
    assert_eq!(*second_posts.lock().unwrap(), vec![text]);
}
