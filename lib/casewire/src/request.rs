//! Request orchestration.
//!
//! [`request`] takes a [`RequestDescriptor`] through building, sending,
//! receiving and classifying, and hands back a future that can be cancelled
//! at any point before it settles.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use casewire_core::url_builder::build_url;
use casewire_core::{
    ApiResult, CamelizedResponse, HttpClient, RawBody, Request, RequestDescriptor, Response,
    build_body, classify, encode_form_data, is_json_content_type,
};
use futures_util::future::BoxFuture;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::ApiConfig;
use crate::headers::build_headers;
use crate::navigation::is_access_denied;
use crate::{Error, Result};

/// In-flight API call.
///
/// Resolves to the camel-cased response body, or to the value of the
/// requested response header. Nothing happens until it is polled.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> casewire::Result<()> {
/// use std::sync::Arc;
/// use casewire::{ApiConfig, HyperClient, Method, RequestDescriptor, request};
///
/// let config = Arc::new(ApiConfig::builder().base("https://hope.example.org").build());
/// let descriptor = RequestDescriptor::builder(Method::Get, "/api/rest/programs/").build();
///
/// let call = request(HyperClient::new(), config, descriptor);
/// let cancel = call.canceller();
/// // hand `cancel` to whoever may abort the call
/// let programs = call.await?;
/// # let _ = (cancel, programs);
/// # Ok(())
/// # }
/// ```
#[must_use = "requests do nothing unless awaited"]
pub struct CancelableRequest {
    token: CancellationToken,
    future: BoxFuture<'static, Result<Option<Value>>>,
}

impl CancelableRequest {
    /// Token that cancels this request.
    #[must_use]
    pub fn canceller(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel this request.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl std::fmt::Debug for CancelableRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelableRequest")
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Future for CancelableRequest {
    type Output = Result<Option<Value>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().future.as_mut().poll(cx)
    }
}

/// Start an API call.
pub fn request<C>(
    client: C,
    config: Arc<ApiConfig>,
    descriptor: RequestDescriptor,
) -> CancelableRequest
where
    C: HttpClient + 'static,
{
    let token = CancellationToken::new();
    let span = info_span!(
        "api_request",
        method = %descriptor.method(),
        url = descriptor.url(),
    );

    let cancel = token.clone();
    let future =
        async move { execute(&client, &config, &descriptor, &cancel).await }.instrument(span);

    CancelableRequest {
        token,
        future: Box::pin(future),
    }
}

async fn execute<C: HttpClient>(
    client: &C,
    config: &ApiConfig,
    descriptor: &RequestDescriptor,
    token: &CancellationToken,
) -> Result<Option<Value>> {
    if token.is_cancelled() {
        return Err(Error::Cancelled);
    }
    let start = Instant::now();

    let url = build_url(
        config.base(),
        config.version(),
        &|value: &str| config.encode_path(value),
        descriptor,
    );
    let parsed_url = url::Url::parse(&url)?;

    let headers = tokio::select! {
        biased;
        () = token.cancelled() => return Err(Error::Cancelled),
        headers = build_headers(config, descriptor) => headers,
    };

    let wire = descriptor.to_wire();
    let body = match build_body(&wire)? {
        Some(body) => Some(body),
        None => wire
            .form_data()
            .map(|value| RawBody::Multipart(encode_form_data(value, None, None))),
    };
    debug!(
        %url,
        body = body.as_ref().map(RawBody::kind),
        credentials = config.credentials().as_str(),
        "request prepared"
    );

    let request = Request::builder(descriptor.method(), parsed_url)
        .headers(headers)
        .raw_body(body)
        .build();
    let response = CamelizedResponse::new(send_request(client, request, token).await?);

    let (raw, body) = read_response_body(&response);
    if is_access_denied(response.status(), raw.as_ref()) {
        info!(route = config.access_denied_route(), "access denied");
        config.navigator().navigate(config.access_denied_route());
    }

    let header_value = descriptor
        .response_header()
        .and_then(|name| response.header(name))
        .map(|value| Value::String(value.to_string()));

    let inner = response.inner();
    let result = ApiResult {
        url,
        ok: inner.is_success(),
        status: inner.status(),
        status_text: inner.status_text().to_string(),
        body: header_value.or(body),
    };

    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    if result.ok {
        info!(status = result.status, elapsed_ms, "request completed");
    } else {
        warn!(status = result.status, elapsed_ms, "request failed");
    }

    classify(descriptor, &result)?;
    Ok(result.body)
}

/// Issue the transport call unless the request was cancelled.
///
/// Cancellation during the call drops the transport future, which aborts it.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] on cancellation, or the transport error.
pub async fn send_request<C: HttpClient>(
    client: &C,
    request: Request<Bytes>,
    token: &CancellationToken,
) -> Result<Response<Bytes>> {
    if token.is_cancelled() {
        return Err(Error::Cancelled);
    }

    tokio::select! {
        biased;
        () = token.cancelled() => {
            debug!("request aborted in flight");
            Err(Error::Cancelled)
        }
        response = client.execute(request) => response,
    }
}

/// Parse the response body by content type.
///
/// Returns the body as sent and its camel-cased form. Failures are logged
/// and read as no body.
fn read_response_body(response: &CamelizedResponse) -> (Option<Value>, Option<Value>) {
    if response.status() == 204 {
        return (None, None);
    }
    let Some(content_type) = response.header("Content-Type") else {
        return (None, None);
    };

    if is_json_content_type(content_type) {
        match response.raw_json() {
            Ok(raw) => {
                let camelized = casewire_core::case::camelize_response(&raw);
                (Some(raw), Some(camelized))
            }
            Err(err) => {
                warn!(error = %err, content_type, "unreadable JSON response body");
                (None, None)
            }
        }
    } else {
        match response.text() {
            Ok(text) => {
                let text = Value::String(text);
                (Some(text.clone()), Some(text))
            }
            Err(err) => {
                warn!(error = %err, content_type, "unreadable text response body");
                (None, None)
            }
        }
    }
}
