//! Mock platform implementation for testing
//!
//! A configurable mock that can simulate successes, failures, and network
//! delays. Used by broadcaster tests to verify fan-out, result alignment,
//! and cancellation without platform credentials or network access.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::sleep;

use crate::cancel::with_cancel;
use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{Message, PostOptions};

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform id, also used as the display name.
    pub name: String,

    /// Whether posting should succeed.
    pub post_succeeds: bool,

    /// Error to return on posting failure.
    pub post_error: Option<String>,

    /// Delay before completing a post (simulates network latency).
    /// Cancel-aware: a fired token interrupts the delay.
    pub delay: Duration,

    /// Number of times post has been called.
    pub post_call_count: Arc<Mutex<usize>>,

    /// Texts that have been posted (for verification).
    pub posted_content: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            post_succeeds: true,
            post_error: None,
            delay: Duration::from_millis(0),
            post_call_count: Arc::new(Mutex::new(0)),
            posted_content: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
#[derive(Debug)]
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock platform that always succeeds.
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// Create a mock platform that fails posting.
    pub fn post_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            post_succeeds: false,
            post_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// Create a mock platform with a delay.
    pub fn with_delay(name: &str, delay: Duration) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            delay,
            ..Default::default()
        })
    }

    /// Get the number of times post was called.
    pub fn post_call_count(&self) -> usize {
        *self.config.post_call_count.lock().unwrap()
    }

    /// Get all text that was posted.
    pub fn posted_content(&self) -> Vec<String> {
        self.config.posted_content.lock().unwrap().clone()
    }

    /// Handles to the shared counters, for asserting after the platform
    /// has been boxed into a broadcaster.
    pub fn counters(&self) -> (Arc<Mutex<usize>>, Arc<Mutex<Vec<String>>>) {
        (
            self.config.post_call_count.clone(),
            self.config.posted_content.clone(),
        )
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn id(&self) -> &str {
        &self.config.name
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    async fn post(&self, message: &Message, options: &PostOptions) -> Result<Value> {
        *self.config.post_call_count.lock().unwrap() += 1;

        if message.text.is_empty() {
            return Err(PlatformError::Validation("message text cannot be empty".to_string()).into());
        }

        if !self.config.delay.is_zero() {
            with_cancel(options.cancel.as_ref(), async {
                sleep(self.config.delay).await;
                Ok(())
            })
            .await?;
        }

        if self.config.post_succeeds {
            self.config
                .posted_content
                .lock()
                .unwrap()
                .push(message.text.clone());

            Ok(json!({
                "id": format!("{}:mock-post", self.config.name),
                "url": format!("https://mock.example/{}/post", self.config.name),
            }))
        } else {
            let error_msg = self
                .config
                .post_error
                .clone()
                .unwrap_or_else(|| "Mock posting failed".to_string());
            Err(PlatformError::Api {
                status: 500,
                status_text: "Internal Server Error".to_string(),
                code: Some("MockFailure".to_string()),
                message: Some(error_msg),
            }
            .into())
        }
    }

    fn url_from_response(&self, response: &Value) -> Option<String> {
        response.get("url")?.as_str().map(str::to_string)
    }
}
