//! Request bodies and body serialization utilities.

use bytes::Bytes;
use serde_json::Value;

use crate::{Blob, Form, RequestDescriptor, Result};

/// Well-known content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `application/json`.
    Json,
    /// `application/problem+json`.
    ProblemJson,
    /// `text/plain`.
    PlainText,
    /// `application/octet-stream`.
    OctetStream,
    /// `multipart/form-data`; the boundary is added by the form.
    Multipart,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::ProblemJson => "application/problem+json",
            Self::PlainText => "text/plain",
            Self::OctetStream => "application/octet-stream",
            Self::Multipart => "multipart/form-data",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a response `Content-Type` should be parsed as JSON.
#[must_use]
pub fn is_json_content_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    [ContentType::Json, ContentType::ProblemJson]
        .iter()
        .any(|json| content_type.starts_with(json.as_str()))
}

/// Body given by the caller.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Structured payload; snake-cased before sending.
    Json(Value),
    /// Raw text.
    Text(String),
    /// Binary content.
    Blob(Blob),
    /// Pre-built multipart form.
    Multipart(Form),
}

/// Body as handed to the transport.
#[derive(Debug, Clone)]
pub enum RawBody {
    /// Text, including serialized JSON.
    Text(String),
    /// Binary content.
    Blob(Blob),
    /// Multipart form; its boundary decides the content type.
    Multipart(Form),
}

impl RawBody {
    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Multipart(_) => "multipart",
        }
    }

    /// Split into an optional forced content type and the body bytes.
    ///
    /// Only multipart bodies force a content type.
    #[must_use]
    pub fn into_bytes(self) -> (Option<String>, Bytes) {
        match self {
            Self::Text(text) => (None, Bytes::from(text)),
            Self::Blob(blob) => (None, blob.data().clone()),
            Self::Multipart(form) => {
                let (content_type, body) = form.into_body();
                (Some(content_type), body)
            }
        }
    }
}

/// Serialize the descriptor body for the wire.
///
/// A media type containing `/json` serializes text as a JSON string literal.
/// Blobs are sent as they are, since they already hold the encoded document.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn build_body(descriptor: &RequestDescriptor) -> Result<Option<RawBody>> {
    let Some(body) = descriptor.body() else {
        return Ok(None);
    };

    let declared_json = descriptor
        .media_type()
        .is_some_and(|media_type| media_type.contains("/json"));

    let raw = match body {
        RequestBody::Multipart(form) => RawBody::Multipart(form.clone()),
        RequestBody::Json(value) => RawBody::Text(serde_json::to_string(value)?),
        RequestBody::Text(text) if declared_json => RawBody::Text(serde_json::to_string(text)?),
        RequestBody::Text(text) => RawBody::Text(text.clone()),
        RequestBody::Blob(blob) => RawBody::Blob(blob.clone()),
    };
    Ok(Some(raw))
}

/// `Content-Type` the request should declare, if any.
///
/// Multipart bodies get none here: the transport adds the boundary.
#[must_use]
pub fn request_content_type(descriptor: &RequestDescriptor) -> Option<String> {
    let body = descriptor.body()?;
    if matches!(body, RequestBody::Multipart(_)) {
        return None;
    }
    if let Some(media_type) = descriptor.media_type() {
        return Some(media_type.to_string());
    }
    let content_type = match body {
        RequestBody::Blob(blob) => blob.mime_type().unwrap_or(ContentType::OctetStream.as_str()),
        RequestBody::Text(_) => ContentType::PlainText.as_str(),
        RequestBody::Json(_) | RequestBody::Multipart(_) => ContentType::Json.as_str(),
    };
    Some(content_type.to_string())
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// # Errors
///
/// Returns an error naming the failing path (e.g. `household.size`).
///
/// # Example
///
/// ```
/// use casewire_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct Household { size: u32 }
///
/// let household: Household = from_json(br#"{"size":4}"#).expect("deserialize");
/// assert_eq!(household, Household { size: 4 });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

/// Deserialize an already-parsed JSON value with path-aware error messages.
///
/// # Errors
///
/// Returns an error naming the failing path.
pub fn from_value<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
