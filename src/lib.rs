//! Crosscast - concurrent multi-platform post broadcaster
//!
//! Fans one message out to every configured platform concurrently,
//! computing byte-accurate rich-text facets (links, mentions, hashtags)
//! along the way and collecting per-platform outcomes that never interfere
//! with each other.

pub mod broadcaster;
pub mod cancel;
pub mod config;
pub mod error;
pub mod logging;
pub mod platforms;
pub mod richtext;
pub mod types;

// Re-export commonly used types
pub use broadcaster::{create_platforms, Broadcaster};
pub use cancel::CancellationToken;
pub use config::Config;
pub use error::{CrosscastError, Result};
pub use types::{Facet, FacetKind, Image, Message, PostOptions, PostOutcome, PostResult};
