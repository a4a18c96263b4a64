//! Bluesky platform implementation
//!
//! Speaks AT-protocol XRPC directly over HTTP: `createSession` →
//! (`resolveHandle` per mention) → (`uploadBlob` per image) →
//! `createRecord`. Facet byte ranges are computed by the rich-text
//! pipeline and serialized into the `app.bsky.richtext.facet` wire shape.

use std::io::Cursor;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::cancel::with_cancel;
use crate::config::BlueskyConfig;
use crate::error::{ConfigError, CrosscastError, PlatformError, Result};
use crate::platforms::Platform;
use crate::richtext::{detect_facets, display_length, resolve_mentions, LengthRule};
use crate::richtext::{MentionResolver, Resolution};
use crate::types::{Facet, FacetKind, Message, PostOptions};

const MAX_POST_LENGTH: usize = 300;

/// Authenticated session returned by `com.atproto.server.createSession`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    access_jwt: String,
    did: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveHandleResponse {
    did: String,
}

/// Structured error body XRPC endpoints return on non-success.
#[derive(Debug, Default, Deserialize)]
struct XrpcErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn net_err(e: reqwest::Error) -> CrosscastError {
    PlatformError::Network(e.to_string()).into()
}

/// Turn a non-success response into [`PlatformError::Api`] carrying the
/// HTTP status, status text, and the platform's structured error body;
/// parse successful bodies as JSON.
async fn check_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body: XrpcErrorBody = response.json().await.unwrap_or_default();
        return Err(PlatformError::Api {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            code: body.error,
            message: body.message,
        }
        .into());
    }
    response.json().await.map_err(net_err)
}

/// Decode width and height from an image header.
///
/// Caller-supplied dimensions are never trusted; undecodable bytes are a
/// call-time validation failure.
fn decode_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    let reader = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| PlatformError::Validation(format!("could not read image header: {e}")))?;
    reader
        .into_dimensions()
        .map_err(|e| PlatformError::Validation(format!("could not decode image header: {e}")).into())
}

fn facet_to_wire(facet: &Facet) -> Value {
    let feature = match facet.kind {
        FacetKind::Link => json!({
            "$type": "app.bsky.richtext.facet#link",
            "uri": facet.target,
        }),
        FacetKind::Mention => json!({
            "$type": "app.bsky.richtext.facet#mention",
            "did": facet.target,
        }),
        FacetKind::Hashtag => json!({
            "$type": "app.bsky.richtext.facet#tag",
            "tag": facet.target,
        }),
    };
    json!({
        "index": { "byteStart": facet.byte_start, "byteEnd": facet.byte_end },
        "features": [feature],
    })
}

/// Bluesky platform client.
///
/// Sessions are created per `post` call rather than cached: one extra
/// round trip buys freedom from refresh-expiry races, so re-entrant calls
/// share no mutable state at all.
#[derive(Debug)]
pub struct BlueskyClient {
    http: reqwest::Client,
    config: BlueskyConfig,
    service: String,
}

impl BlueskyClient {
    /// Create a new Bluesky client from explicit configuration.
    ///
    /// Fails fast, naming the field, when a required credential is
    /// missing. No network I/O happens here.
    pub fn new(config: BlueskyConfig) -> Result<Self> {
        if config.identifier.trim().is_empty() {
            return Err(ConfigError::MissingField("bluesky.identifier".to_string()).into());
        }
        if config.app_password.trim().is_empty() {
            return Err(ConfigError::MissingField("bluesky.app_password".to_string()).into());
        }

        let service = if config.service.starts_with("http://")
            || config.service.starts_with("https://")
        {
            config.service.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", config.service.trim_end_matches('/'))
        };

        Ok(Self {
            http: reqwest::Client::new(),
            config,
            service,
        })
    }

    fn xrpc(&self, method: &str) -> String {
        format!("{}/xrpc/{}", self.service, method)
    }

    /// Call-time argument checks. Runs before any network I/O.
    fn validate(&self, message: &Message) -> Result<()> {
        if message.text.trim().is_empty() {
            return Err(PlatformError::Validation("message text cannot be empty".to_string()).into());
        }
        for (i, image) in message.images.iter().enumerate() {
            if image.data.is_empty() {
                return Err(PlatformError::Validation(format!(
                    "image {} carries no binary payload",
                    i
                ))
                .into());
            }
        }
        let length = display_length(&message.text);
        if length > MAX_POST_LENGTH {
            return Err(PlatformError::Validation(format!(
                "message exceeds Bluesky's {} character limit (current: {} characters)",
                MAX_POST_LENGTH, length
            ))
            .into());
        }
        Ok(())
    }

    async fn create_session(&self) -> Result<Session> {
        debug!(identifier = %self.config.identifier, "creating Bluesky session");
        let response = self
            .http
            .post(self.xrpc("com.atproto.server.createSession"))
            .json(&json!({
                "identifier": self.config.identifier,
                "password": self.config.app_password,
            }))
            .send()
            .await
            .map_err(net_err)?;
        let body = check_response(response).await?;
        serde_json::from_value(body)
            .map_err(|e| PlatformError::Network(format!("malformed session response: {e}")).into())
    }

    async fn upload_blob(&self, session: &Session, data: &[u8]) -> Result<Value> {
        let mime = image::guess_format(data)
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream");
        debug!(bytes = data.len(), mime, "uploading blob");

        let response = self
            .http
            .post(self.xrpc("com.atproto.repo.uploadBlob"))
            .bearer_auth(&session.access_jwt)
            .header(reqwest::header::CONTENT_TYPE, mime)
            .body(data.to_vec())
            .send()
            .await
            .map_err(net_err)?;
        let body = check_response(response).await?;
        body.get("blob")
            .cloned()
            .ok_or_else(|| PlatformError::Network("upload response carries no blob".to_string()).into())
    }

    async fn create_record(&self, session: &Session, record: Value) -> Result<Value> {
        let response = self
            .http
            .post(self.xrpc("com.atproto.repo.createRecord"))
            .bearer_auth(&session.access_jwt)
            .json(&json!({
                "repo": session.did,
                "collection": "app.bsky.feed.post",
                "record": record,
            }))
            .send()
            .await
            .map_err(net_err)?;
        check_response(response).await
    }

    fn build_record(&self, text: String, facets: &[Facet], images: Vec<Value>) -> Value {
        let mut record = serde_json::Map::new();
        record.insert("$type".to_string(), json!("app.bsky.feed.post"));
        record.insert("text".to_string(), json!(text));
        record.insert(
            "createdAt".to_string(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        if !facets.is_empty() {
            record.insert(
                "facets".to_string(),
                Value::Array(facets.iter().map(facet_to_wire).collect()),
            );
        }
        if !images.is_empty() {
            record.insert(
                "embed".to_string(),
                json!({ "$type": "app.bsky.embed.images", "images": images }),
            );
        }
        Value::Object(record)
    }
}

#[async_trait]
impl MentionResolver for BlueskyClient {
    /// One `com.atproto.identity.resolveHandle` round trip per mention.
    /// Anything short of a resolved DID drops the facet, never the post.
    async fn resolve(&self, handle: &str) -> Resolution {
        let response = match self
            .http
            .get(self.xrpc("com.atproto.identity.resolveHandle"))
            .query(&[("handle", handle)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Resolution::Failed(e.to_string()),
        };
        if !response.status().is_success() {
            return Resolution::Unresolved;
        }
        match response.json::<ResolveHandleResponse>().await {
            Ok(body) => Resolution::Resolved(body.did),
            Err(e) => Resolution::Failed(e.to_string()),
        }
    }
}

#[async_trait]
impl Platform for BlueskyClient {
    fn id(&self) -> &str {
        "bluesky"
    }

    fn name(&self) -> &str {
        "Bluesky"
    }

    fn max_length(&self) -> Option<usize> {
        Some(MAX_POST_LENGTH)
    }

    fn length_rule(&self) -> LengthRule {
        LengthRule::UnicodeScalars
    }

    fn supports_rich_text(&self) -> bool {
        true
    }

    async fn post(&self, message: &Message, options: &PostOptions) -> Result<Value> {
        self.validate(message)?;
        let cancel = options.cancel.as_ref();

        let session = with_cancel(cancel, self.create_session()).await?;

        let (text, facets) = detect_facets(&message.text);
        let facets = resolve_mentions(facets, self, cancel).await?;

        let mut images = Vec::new();
        for image in &message.images {
            let (width, height) = decode_dimensions(&image.data)?;
            let blob = with_cancel(cancel, self.upload_blob(&session, &image.data)).await?;
            images.push(json!({
                "image": blob,
                "alt": image.alt.clone().unwrap_or_default(),
                "aspectRatio": { "width": width, "height": height },
            }));
        }

        let record = self.build_record(text, &facets, images);
        let response = with_cancel(cancel, self.create_record(&session, record)).await?;
        debug!(uri = response.get("uri").and_then(serde_json::Value::as_str), "posted to Bluesky");
        Ok(response)
    }

    fn url_from_response(&self, response: &Value) -> Option<String> {
        // at://did:plc:xxx/app.bsky.feed.post/rkey → public bsky.app URL
        let uri = response.get("uri")?.as_str()?;
        let rest = uri.strip_prefix("at://")?;
        let mut parts = rest.split('/');
        let did = parts.next()?;
        let collection = parts.next()?;
        let rkey = parts.next()?;
        if collection != "app.bsky.feed.post" || rkey.is_empty() {
            return None;
        }
        Some(format!("https://bsky.app/profile/{did}/post/{rkey}"))
    }
}
