//! Platform abstraction and implementations
//!
//! This module provides a unified trait for the posting capability each
//! platform implementation satisfies. The broadcaster holds only the trait
//! type; the concrete set of platforms is closed and assembled from
//! configuration flags.
//!
//! # Examples
//!
//! ```no_run
//! use crosscast::platforms::{bluesky::BlueskyClient, Platform};
//! use crosscast::config::BlueskyConfig;
//! use crosscast::types::{Message, PostOptions};
//!
//! # async fn example() -> crosscast::error::Result<()> {
//! let config = BlueskyConfig {
//!     enabled: true,
//!     identifier: "alice.bsky.social".to_string(),
//!     app_password: "app-password".to_string(),
//!     service: "https://bsky.social".to_string(),
//! };
//!
//! let platform = BlueskyClient::new(config)?;
//! let message = Message::new("Hello @bob.bsky.social, see https://example.com");
//!
//! let response = platform.post(&message, &PostOptions::default()).await?;
//! if let Some(url) = platform.url_from_response(&response) {
//!     println!("posted: {}", url);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::richtext::LengthRule;
use crate::types::{Message, PostOptions};

pub mod bluesky;

// Mock platform is available for all builds (not just tests) to support
// integration tests.
pub mod mock;

/// Posting capability every platform implementation provides.
///
/// Implementations are constructed once from explicit configuration and
/// stay immutable apart from internally-owned session state; `post` takes
/// `&self` and must tolerate being invoked again while an earlier call is
/// still in flight without corrupting that state.
#[async_trait]
pub trait Platform: Send + Sync + std::fmt::Debug {
    /// Stable lowercase platform id (e.g. "bluesky").
    fn id(&self) -> &str;

    /// Human-readable display name (e.g. "Bluesky").
    fn name(&self) -> &str;

    /// Maximum post length under this platform's counting rule, or `None`
    /// if there is no hard limit.
    fn max_length(&self) -> Option<usize> {
        None
    }

    /// How this platform counts post length.
    fn length_rule(&self) -> LengthRule {
        LengthRule::UnicodeScalars
    }

    /// Whether posts carry rich-text annotations. When true, `post` runs
    /// the facet detector and mention resolver over the message text.
    fn supports_rich_text(&self) -> bool {
        false
    }

    /// Post a message, returning the platform's raw response body.
    ///
    /// Contract:
    /// 1. Call-time validation (non-empty text, every image carries a
    ///    concrete binary payload) rejects before any network I/O.
    /// 2. Establish or reuse an authenticated session.
    /// 3. When the platform supports rich text, detect facets and resolve
    ///    mentions over the message text.
    /// 4. Upload image attachments before creating the post record.
    /// 5. On a non-success response, raise
    ///    [`crate::error::PlatformError::Api`] embedding HTTP status,
    ///    status text, and the platform's structured error code/message.
    ///
    /// A fired cancellation signal in `options` rejects with
    /// [`crate::error::CrosscastError::Cancelled`].
    async fn post(&self, message: &Message, options: &PostOptions) -> Result<serde_json::Value>;

    /// Canonical, shareable URL for a post, derived from the `post`
    /// response. `None` when the response carries no usable identifier.
    fn url_from_response(&self, response: &serde_json::Value) -> Option<String>;
}
