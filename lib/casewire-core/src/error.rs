//! Error types and response classification.

use std::collections::BTreeMap;

use derive_more::{Display, Error, From};
use serde_json::Value;

use crate::{ApiResult, RequestDescriptor};

/// Messages used for well-known failure statuses.
///
/// Per-request overrides from [`RequestDescriptor::errors`] take precedence.
pub const DEFAULT_ERROR_MESSAGES: [(u16, &str); 7] = [
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (500, "Internal Server Error"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
];

/// A failed API call, with the descriptor and result that produced it.
#[derive(Debug, Clone, Display)]
#[display("{message}")]
pub struct ApiError {
    descriptor: RequestDescriptor,
    result: ApiResult,
    message: String,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(
        descriptor: RequestDescriptor,
        result: ApiResult,
        message: impl Into<String>,
    ) -> Self {
        Self {
            descriptor,
            result,
            message: message.into(),
        }
    }

    /// Descriptor of the failed call.
    #[must_use]
    pub const fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Outcome of the failed call.
    #[must_use]
    pub const fn result(&self) -> &ApiResult {
        &self.result
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Resolved URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.result.url
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.result.status
    }

    /// Parsed response body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.result.body.as_ref()
    }
}

/// Main error type for casewire operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Declared or generic API failure.
    #[display("{_0}")]
    #[from(skip)]
    Api(#[error(not(source))] Box<ApiError>),

    /// The request was cancelled before it settled.
    #[display("request aborted")]
    #[from(skip)]
    Cancelled,

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "household.head.age").
        path: String,
        /// Error message.
        message: String,
    },

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl From<ApiError> for Error {
    fn from(error: ApiError) -> Self {
        Self::Api(Box::new(error))
    }
}

impl Error {
    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if the request was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// The API error, if this is one.
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this is an API error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.api_error().map(ApiError::status)
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns `true` if this is a 404 Not Found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Try to decode the API error body.
    ///
    /// Returns `None` when there is no body or this is not an API error.
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.api_error()
            .and_then(ApiError::body)
            .map(|body| crate::from_value(body.clone()))
    }
}

/// Turn a call outcome into an error when it signals failure.
///
/// A status listed in [`DEFAULT_ERROR_MESSAGES`] or in the descriptor
/// overrides always fails, even when `ok` is set. Any other non-ok result
/// fails with a generic message.
///
/// # Errors
///
/// Returns [`Error::Api`] for failed calls.
pub fn classify(descriptor: &RequestDescriptor, result: &ApiResult) -> Result<()> {
    let mut messages: BTreeMap<u16, String> = DEFAULT_ERROR_MESSAGES
        .iter()
        .map(|(status, message)| (*status, (*message).to_string()))
        .collect();
    messages.extend(descriptor.errors().clone());

    if let Some(message) = messages.remove(&result.status) {
        return Err(ApiError::new(descriptor.clone(), result.clone(), message).into());
    }

    if !result.ok {
        let body = result
            .body
            .as_ref()
            .and_then(|body| serde_json::to_string_pretty(body).ok())
            .unwrap_or_else(|| "undefined".to_string());
        let message = format!(
            "Generic Error: status: {}; status text: {}; body: {body}",
            result.status, result.status_text
        );
        return Err(ApiError::new(descriptor.clone(), result.clone(), message).into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;
    use crate::Method;

    fn result(status: u16, ok: bool, body: Option<Value>) -> ApiResult {
        ApiResult {
            url: "https://api.test/households/".to_string(),
            ok,
            status,
            status_text: http::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or_default()
                .to_string(),
            body,
        }
    }

    fn descriptor() -> RequestDescriptor {
        RequestDescriptor::builder(Method::Get, "/households/").build()
    }

    #[test]
    fn error_display() {
        check!(Error::Timeout.to_string() == "request timeout");
        check!(Error::Cancelled.to_string() == "request aborted");
        check!(Error::connection("refused").to_string() == "connection error: refused");
        check!(
            Error::json_deserialization("household.size", "invalid type").to_string()
                == "JSON deserialization error at 'household.size': invalid type"
        );
    }

    #[test]
    fn default_table_messages() {
        for (status, message) in DEFAULT_ERROR_MESSAGES {
            let err = classify(&descriptor(), &result(status, false, None)).expect_err("fails");
            check!(err.to_string() == message);
            check!(err.status() == Some(status));
        }
    }

    #[test]
    fn table_entry_fails_even_when_ok() {
        let descriptor = RequestDescriptor::builder(Method::Post, "/import/")
            .error(200, "Import rejected")
            .build();
        let err = classify(&descriptor, &result(200, true, None)).expect_err("fails");
        check!(err.to_string() == "Import rejected");
    }

    #[test]
    fn overrides_win() {
        let descriptor = RequestDescriptor::builder(Method::Get, "/households/{id}/")
            .error(404, "Household not found")
            .build();
        let err = classify(&descriptor, &result(404, false, None)).expect_err("fails");

        let_assert!(Some(api) = err.api_error());
        check!(api.message() == "Household not found");
        check!(api.descriptor().url() == "/households/{id}/");
        check!(api.url() == "https://api.test/households/");
        check!(err.is_not_found());
        check!(err.is_client_error());
        check!(!err.is_server_error());
    }

    #[test]
    fn generic_message_with_body() {
        let body = json!({ "detail": "Conflict", "code": 9 });
        let err = classify(&descriptor(), &result(409, false, Some(body))).expect_err("fails");
        insta::assert_snapshot!(err.to_string(), @r#"
        Generic Error: status: 409; status text: Conflict; body: {
          "detail": "Conflict",
          "code": 9
        }
        "#);
    }

    #[test]
    fn generic_message_without_body() {
        let err = classify(&descriptor(), &result(418, false, None)).expect_err("fails");
        check!(
            err.to_string()
                == "Generic Error: status: 418; status text: I'm a teapot; body: undefined"
        );
    }

    #[test]
    fn ok_without_entry_passes() {
        check!(classify(&descriptor(), &result(200, true, Some(json!([])))).is_ok());
        check!(classify(&descriptor(), &result(204, true, None)).is_ok());
    }

    #[test]
    fn decode_api_body() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Problem {
            detail: String,
        }

        let body = json!({ "detail": "Program is closed" });
        let err = classify(&descriptor(), &result(400, false, Some(body))).expect_err("fails");

        let_assert!(Some(Ok(problem)) = err.decode_body::<Problem>());
        check!(problem.detail == "Program is closed");
        check!(Error::Timeout.decode_body::<Problem>().is_none());
    }

    #[test]
    fn predicates() {
        check!(Error::Cancelled.is_cancelled());
        check!(!Error::Timeout.is_cancelled());
        check!(Error::Timeout.is_timeout());
        check!(Error::connection("x").is_connection());
        check!(Error::Timeout.status().is_none());
    }
}
