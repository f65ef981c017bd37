//! Transport-level exchange logging.

use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use tower::{Layer, Service};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{Error, Request, Response, Result};

/// Headers whose values never reach the logs.
const SENSITIVE_HEADERS: [&str; 2] = ["authorization", "cookie"];

/// How much of each exchange is logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Status and timing, plus outgoing headers with credentials masked.
    Debug,
    /// Status and timing.
    #[default]
    Info,
}

/// Layer producing a [`Logging`] service.
///
/// ```no_run
/// use casewire::HyperClient;
/// use casewire::middleware::LoggingLayer;
///
/// let client = HyperClient::builder().layer(LoggingLayer::debug()).build();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

impl LoggingLayer {
    /// Summary logging.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Summary logging plus masked request headers.
    #[must_use]
    pub const fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service logging every exchange inside a `transport` span.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Service<Request<Bytes>> for Logging<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = BoxFuture<'static, Result<Response<Bytes>>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let span = info_span!(
            "transport",
            method = %request.method(),
            host = request.url().host_str().unwrap_or_default(),
            path = request.url().path(),
        );
        if self.level == LogLevel::Debug {
            span.in_scope(|| debug!(headers = ?masked_headers(&request), "outgoing headers"));
        }

        let exchange = self.inner.call(request);
        Box::pin(
            async move {
                let started = Instant::now();
                let outcome = exchange.await;
                log_outcome(&outcome, started);
                outcome
            }
            .instrument(span),
        )
    }
}

fn log_outcome(outcome: &Result<Response<Bytes>>, started: Instant) {
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    match outcome {
        Ok(response) if response.is_success() => info!(
            status = response.status(),
            bytes = response.body().len(),
            elapsed_ms,
            "exchange complete"
        ),
        Ok(response) => warn!(
            status = response.status(),
            reason = response.status_text(),
            elapsed_ms,
            "exchange returned an error status"
        ),
        Err(err) => warn!(error = %err, elapsed_ms, "exchange failed"),
    }
}

/// Sorted `name: value` lines with credential values masked.
fn masked_headers(request: &Request<Bytes>) -> Vec<String> {
    let mut lines = request
        .headers()
        .iter()
        .map(|(name, value)| {
            let lowered = name.to_ascii_lowercase();
            if SENSITIVE_HEADERS.contains(&lowered.as_str()) {
                format!("{name}: ***")
            } else {
                format!("{name}: {value}")
            }
        })
        .collect::<Vec<_>>();
    lines.sort();
    lines
}
