//! Multi-platform broadcast orchestration
//!
//! Fans one message out to every configured platform concurrently and
//! collects per-platform outcomes without letting one failure affect
//! another. There is no retry at this layer: each adapter gets exactly one
//! HTTP attempt, and the per-platform result carries enough detail to
//! retry manually.

use futures::future::join_all;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::platforms::{bluesky::BlueskyClient, Platform};
use crate::types::{Message, PostOptions, PostOutcome, PostResult};

/// Concurrent fan-out over an ordered platform list.
///
/// # Examples
///
/// ```no_run
/// use crosscast::broadcaster::{create_platforms, Broadcaster};
/// use crosscast::config::Config;
/// use crosscast::types::{Message, PostOptions};
///
/// # async fn example() -> crosscast::error::Result<()> {
/// let config = Config::from_toml_str(r#"
///     [bluesky]
///     identifier = "alice.bsky.social"
///     app_password = "app-password"
/// "#)?;
///
/// let broadcaster = Broadcaster::new(create_platforms(&config)?);
/// let results = broadcaster
///     .broadcast(&Message::new("Hello, everyone!"), &PostOptions::default())
///     .await;
///
/// for result in &results {
///     match result.url() {
///         Some(url) => println!("{}: {}", result.platform, url),
///         None => eprintln!("{}: {}", result.platform, result.reason().unwrap_or_default()),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct Broadcaster {
    platforms: Vec<Box<dyn Platform>>,
}

impl Broadcaster {
    pub fn new(platforms: Vec<Box<dyn Platform>>) -> Self {
        Self { platforms }
    }

    pub fn platforms(&self) -> &[Box<dyn Platform>] {
        &self.platforms
    }

    /// Post to every platform concurrently.
    ///
    /// Returns one [`PostResult`] per platform, aligned index-for-index
    /// with the platform list regardless of completion order. One
    /// platform's failure never cancels, delays, or mutates another's
    /// entry.
    pub async fn broadcast(&self, message: &Message, options: &PostOptions) -> Vec<PostResult> {
        let platform_refs: Vec<&dyn Platform> =
            self.platforms.iter().map(|p| p.as_ref()).collect();
        broadcast_to_platforms(&platform_refs, message, options).await
    }

    /// Post only to the platforms whose id appears in `platform_ids`,
    /// preserving the configured order among the selected ones.
    pub async fn broadcast_to(
        &self,
        message: &Message,
        options: &PostOptions,
        platform_ids: &[&str],
    ) -> Vec<PostResult> {
        let selected: Vec<&dyn Platform> = self
            .platforms
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| platform_ids.contains(&p.id()))
            .collect();
        broadcast_to_platforms(&selected, message, options).await
    }
}

/// One concurrent task per platform; `join_all` re-sequences outcomes into
/// input order no matter when each completes.
async fn broadcast_to_platforms(
    platforms: &[&dyn Platform],
    message: &Message,
    options: &PostOptions,
) -> Vec<PostResult> {
    let futures: Vec<_> = platforms
        .iter()
        .map(|platform| async move {
            info!(platform = platform.id(), "posting");

            match platform.post(message, options).await {
                Ok(response) => {
                    let url = platform.url_from_response(&response);
                    info!(
                        platform = platform.id(),
                        url = url.as_deref(),
                        "posted successfully"
                    );
                    PostResult {
                        platform: platform.id().to_string(),
                        outcome: PostOutcome::Posted { url, response },
                    }
                }
                Err(error) => {
                    warn!(platform = platform.id(), %error, "post failed");
                    PostResult {
                        platform: platform.id().to_string(),
                        outcome: PostOutcome::Failed { error },
                    }
                }
            }
        })
        .collect();

    join_all(futures).await
}

/// Create platform instances from configuration.
///
/// Builds a client for every enabled platform section. Construction-time
/// validation (missing credentials) fails here, before any network I/O.
pub fn create_platforms(config: &Config) -> Result<Vec<Box<dyn Platform>>> {
    let mut platforms: Vec<Box<dyn Platform>> = Vec::new();

    if let Some(bluesky_config) = &config.bluesky {
        if bluesky_config.enabled {
            info!("creating Bluesky platform client");
            platforms.push(Box::new(BlueskyClient::new(bluesky_config.clone())?));
        }
    }

    if platforms.is_empty() {
        warn!("no platforms are enabled in configuration");
    } else {
        info!(count = platforms.len(), "created platform clients");
    }

    Ok(platforms)
}
