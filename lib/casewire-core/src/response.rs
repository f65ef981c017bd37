//! HTTP response handling.
//!
//! [`Response`] is what the transport returns. [`CamelizedResponse`] wraps it
//! so JSON reads come back with camelCase keys, and [`ApiResult`] is the
//! summary handed to error classification.

use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;

use crate::case::camelize_response;

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Canonical reason phrase for the status, or empty when unknown.
    #[must_use]
    pub fn status_text(&self) -> &'static str {
        http::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or_default()
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }
}

impl Response<Bytes> {
    /// Deserialize the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        crate::from_json(&self.body)
    }

    /// Get the response body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }
}

/// Response whose JSON reads are camel-cased.
///
/// `pdu_fields` and `flex_fields` stay readable under their wire names too.
/// [`raw_json`](Self::raw_json) still gives the untouched wire payload.
#[derive(Debug, Clone)]
pub struct CamelizedResponse {
    inner: Response<Bytes>,
}

impl CamelizedResponse {
    /// Wrap a transport response.
    #[must_use]
    pub const fn new(inner: Response<Bytes>) -> Self {
        Self { inner }
    }

    /// The wrapped response.
    #[must_use]
    pub const fn inner(&self) -> &Response<Bytes> {
        &self.inner
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.inner.status()
    }

    /// Single header value by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.header(name)
    }

    /// Body parsed as JSON with wire (snake_case) keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not JSON.
    pub fn raw_json(&self) -> crate::Result<Value> {
        self.inner.json()
    }

    /// Body parsed as JSON with camelCase keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not JSON.
    pub fn json(&self) -> crate::Result<Value> {
        self.raw_json().map(|raw| camelize_response(&raw))
    }

    /// Camel-cased body deserialized into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not JSON or does not match `T`.
    pub fn json_as<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        crate::from_value(self.json()?)
    }

    /// Body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        self.inner.text()
    }

    /// Unwrap into the transport response.
    #[must_use]
    pub fn into_inner(self) -> Response<Bytes> {
        self.inner
    }
}

/// Outcome of a call, as seen by error classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult {
    /// Resolved request URL.
    pub url: String,
    /// Status is 2xx.
    pub ok: bool,
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase.
    pub status_text: String,
    /// Camel-cased payload, or the requested response header.
    pub body: Option<Value>,
}
