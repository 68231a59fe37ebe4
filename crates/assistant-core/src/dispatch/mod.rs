//! Requests to the assistant backend
//!
//! The backend exposes two endpoints, `/chat` and `/image`, both taking
//! `{"prompt": "..."}`. Responses are decoded through the schemas below; the
//! chat reply uses an ordered fallback (`output`, then `properties.output`,
//! then [`NO_RESPONSE`]).

pub mod http;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

pub use http::HttpDispatcher;

/// Reply text used when a chat response carries neither output field
pub const NO_RESPONSE: &str = "❌ No response.";

/// Longest slice of a raw error body kept in a [`DispatchError::Status`]
const MAX_ERROR_BODY: usize = 200;

/// Dispatch errors
///
/// Everything here is the "network error" family: the request did not
/// produce a usable, well-formed response.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Connection refused, DNS failure, broken body stream...
    #[error("{0}")]
    Transport(String),

    /// Backend answered with a non-2xx status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Body was not the JSON object we expected
    #[error("invalid response: {0}")]
    Malformed(String),
}

impl DispatchError {
    /// Build a status error, preferring the backend's `{"error": ...}` text
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope { error: Some(error), .. }) if !error.is_empty() => error,
            _ if body.trim().is_empty() => "empty response body".to_string(),
            _ => body.chars().take(MAX_ERROR_BODY).collect(),
        };
        DispatchError::Status { status, message }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DispatchError::Malformed(err.to_string())
        } else {
            DispatchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        DispatchError::Malformed(err.to_string())
    }
}

/// Which rung of the fallback chain produced a chat reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Output,
    NestedOutput,
    Sentinel,
}

/// Normalized chat reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutput {
    pub text: String,
    pub source: ReplySource,
}

/// A base64-encoded PNG returned by the image endpoint
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePayload(String);

impl ImagePayload {
    pub fn new(base64: impl Into<String>) -> Self {
        Self(base64.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `data:` URI suitable for platform image views and media stores
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.0)
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.0.trim())
    }

    /// Approximate decoded size in bytes
    pub fn decoded_len(&self) -> usize {
        let trimmed = self.0.trim_end_matches('=');
        trimmed.len() * 3 / 4
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImagePayload({} base64 chars)", self.0.len())
    }
}

/// Result of an image request that reached the backend successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutput {
    Image(ImagePayload),
    /// Well-formed response without an `image_base64` field
    Empty,
}

/// Backend client interface
///
/// Calls are independent: no session state, no retries, no timeouts.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn send_chat(&self, prompt: &str) -> Result<ChatOutput, DispatchError>;

    async fn send_image(&self, prompt: &str) -> Result<ImageOutput, DispatchError>;
}

#[derive(Serialize)]
pub(crate) struct PromptRequest<'a> {
    pub prompt: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    output: Option<String>,
    /// Free-form metadata; only a string `output` inside it is used
    #[serde(default)]
    properties: Option<JsonValue>,
}

#[derive(Deserialize)]
struct ImageReply {
    #[serde(default)]
    image_base64: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<String>,
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}

/// Parse the body into a JSON object, rejecting arrays and scalars
fn parse_object(body: &str) -> Result<JsonValue, DispatchError> {
    let json: JsonValue = serde_json::from_str(body)?;
    if !json.is_object() {
        return Err(DispatchError::Malformed("expected a JSON object".to_string()));
    }
    Ok(json)
}

/// Decode a `/chat` response body
pub fn decode_chat(body: &str) -> Result<ChatOutput, DispatchError> {
    let reply: ChatReply = serde_json::from_value(parse_object(body)?)?;

    if let Some(text) = non_empty(reply.output) {
        return Ok(ChatOutput {
            text,
            source: ReplySource::Output,
        });
    }

    let nested = reply
        .properties
        .as_ref()
        .and_then(|p| p.get("output"))
        .and_then(JsonValue::as_str)
        .map(str::to_string);
    if let Some(text) = non_empty(nested) {
        return Ok(ChatOutput {
            text,
            source: ReplySource::NestedOutput,
        });
    }

    Ok(ChatOutput {
        text: NO_RESPONSE.to_string(),
        source: ReplySource::Sentinel,
    })
}

/// Decode an `/image` response body
pub fn decode_image(body: &str) -> Result<ImageOutput, DispatchError> {
    let reply: ImageReply = serde_json::from_value(parse_object(body)?)?;

    Ok(match non_empty(reply.image_base64) {
        Some(payload) => ImageOutput::Image(ImagePayload::new(payload)),
        None => ImageOutput::Empty,
    })
}
