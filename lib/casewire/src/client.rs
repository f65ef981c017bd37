//! Pooled HTTPS transport behind the [`HttpClient`] seam.

use std::collections::HashMap;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use casewire_core::HttpClient;
use futures_util::future::BoxFuture;
use http::header::{HeaderName, HeaderValue};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use tower::Layer;
use tower::util::BoxCloneSyncService;
use tower_service::Service;

use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::connector::https_connector;
use crate::middleware::LoggingLayer;
use crate::{Error, Request, Response, Result};

/// Transport stack as seen by middleware layers.
type Transport = BoxCloneSyncService<Request<Bytes>, Response<Bytes>, Error>;

type Pool = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Innermost service: one pooled exchange bounded by the request timeout.
#[derive(Clone)]
struct Exchange {
    pool: Pool,
    timeout: Duration,
}

impl Service<Request<Bytes>> for Exchange {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = BoxFuture<'static, Result<Response<Bytes>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let Self { pool, timeout } = self.clone();
        Box::pin(async move {
            let outgoing = to_http(request)?;
            let exchange = async {
                let (parts, body) = pool
                    .request(outgoing)
                    .await
                    .map_err(|err| transport_error(&err))?
                    .into_parts();
                let body = body.collect().await.map_err(|err| {
                    Error::connection(format!("reading response body: {err}"))
                })?;
                Ok::<_, Error>(from_http(&parts, body.to_bytes()))
            };
            tokio::time::timeout(timeout, exchange)
                .await
                .map_err(|_| Error::Timeout)?
        })
    }
}

fn to_http(request: Request<Bytes>) -> Result<http::Request<Full<Bytes>>> {
    let (method, url, headers, body) = request.into_parts();

    let mut outgoing = http::Request::new(body.map_or_else(Full::default, Full::new));
    *outgoing.method_mut() = method.into();
    *outgoing.uri_mut() = url
        .as_str()
        .parse::<http::Uri>()
        .map_err(|err| Error::invalid_request(err.to_string()))?;

    let target = outgoing.headers_mut();
    for (name, value) in headers {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|err| Error::invalid_request(format!("header {name}: {err}")))?;
        let value = HeaderValue::try_from(value)
            .map_err(|err| Error::invalid_request(format!("header {name}: {err}")))?;
        target.insert(name, value);
    }

    Ok(outgoing)
}

/// Repeated response headers are folded into one comma-separated value.
fn from_http(parts: &http::response::Parts, body: Bytes) -> Response<Bytes> {
    let mut headers: HashMap<String, String> = HashMap::new();
    for (name, value) in &parts.headers {
        let Ok(value) = value.to_str() else { continue };
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    Response::new(parts.status.as_u16(), headers, body)
}

fn transport_error(err: &hyper_util::client::legacy::Error) -> Error {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(current) = source {
        let tls = current.downcast_ref::<rustls::Error>().or_else(|| {
            current
                .downcast_ref::<std::io::Error>()
                .and_then(std::io::Error::get_ref)
                .and_then(|inner| inner.downcast_ref::<rustls::Error>())
        });
        if let Some(tls) = tls {
            return Error::tls(tls.to_string());
        }
        source = current.source();
    }

    Error::connection(err.to_string())
}

/// HTTP client over a pooled hyper connection with rustls.
///
/// Dropping an in-flight [`execute`](HttpClient::execute) future aborts the
/// exchange, which is how request cancellation reaches the socket.
///
/// # Example
///
/// ```no_run
/// use casewire::HyperClient;
/// use std::time::Duration;
///
/// let client = HyperClient::builder()
///     .timeout(Duration::from_secs(20))
///     .with_logging()
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperClient {
    transport: Transport,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// Client with the default transport settings and no middleware.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a client.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// Transport settings in use.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for HyperClient {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let mut transport = self.transport.clone();
        std::future::poll_fn(|cx| transport.poll_ready(cx)).await?;
        transport.call(request).await
    }
}

type Wrap = Box<dyn FnOnce(Transport) -> Transport + Send>;

/// Builder for [`HyperClient`].
#[derive(Default)]
pub struct HyperClientBuilder {
    config: ClientConfigBuilder,
    wraps: Vec<Wrap>,
}

impl std::fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("config", &self.config)
            .field("layers", &self.wraps.len())
            .finish()
    }
}

impl HyperClientBuilder {
    /// Start from prepared transport settings.
    #[must_use]
    pub fn config(mut self, config: &ClientConfig) -> Self {
        self.config = ClientConfig::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_per_host(config.pool_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout);
        self
    }

    /// Upper bound for one exchange, from connect to the last body byte.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Upper bound for establishing a TCP connection.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Idle connections kept per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// How long an idle pooled connection survives.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Wrap the transport in a tower layer.
    ///
    /// The last layer added sees each request first.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<Transport> + Send + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send + 'static,
    {
        self.wraps
            .push(Box::new(move |inner| BoxCloneSyncService::new(layer.layer(inner))));
        self
    }

    /// Log each exchange with its status and duration.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Log each exchange along with its headers, credentials redacted.
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Assemble the pool, then the layers in insertion order.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let config = self.config.build();
        let pool = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector(config.connect_timeout));
        let exchange = Exchange {
            pool,
            timeout: config.timeout,
        };

        let transport = self
            .wraps
            .into_iter()
            .fold(BoxCloneSyncService::new(exchange), |inner, wrap| wrap(inner));

        HyperClient { transport, config }
    }
}

#[cfg(test)]
mod tests {
    use casewire_core::Method;

    use super::*;

    #[test]
    fn defaults_come_from_client_config() {
        let client = HyperClient::new();
        assert_eq!(client.config().timeout, Duration::from_secs(30));
        assert_eq!(client.config().pool_idle_per_host, 32);
    }

    #[test]
    fn builder_overrides_and_counts_layers() {
        let builder = HyperClient::builder()
            .config(
                &ClientConfig::builder()
                    .connect_timeout(Duration::from_secs(2))
                    .build(),
            )
            .timeout(Duration::from_secs(60))
            .with_debug_logging();
        assert!(format!("{builder:?}").contains("layers: 1"));

        let client = builder.build();
        assert_eq!(client.config().timeout, Duration::from_secs(60));
        assert_eq!(client.config().connect_timeout, Duration::from_secs(2));
    }

    #[test]
    fn outgoing_request_carries_method_uri_and_headers() {
        let url = url::Url::parse("https://api.test/households/?page=2").expect("url");
        let request = Request::builder(Method::Post, url)
            .header("X-Business-Area", "afghanistan")
            .body(Bytes::from_static(b"{}"))
            .build();

        let outgoing = to_http(request).expect("convert");

        assert_eq!(*outgoing.method(), http::Method::POST);
        assert_eq!(outgoing.uri(), "https://api.test/households/?page=2");
        assert_eq!(outgoing.headers()["x-business-area"], "afghanistan");
    }

    #[test]
    fn repeated_response_headers_are_folded() {
        let (mut parts, ()) = http::Response::new(()).into_parts();
        parts.status = http::StatusCode::CREATED;
        parts.headers.append("set-cookie", HeaderValue::from_static("a=1"));
        parts.headers.append("set-cookie", HeaderValue::from_static("b=2"));

        let response = from_http(&parts, Bytes::from_static(b"ok"));

        assert_eq!(response.status(), 201);
        assert_eq!(response.header("Set-Cookie"), Some("a=1, b=2"));
        assert_eq!(response.body(), &Bytes::from_static(b"ok"));
    }

    #[test]
    fn invalid_header_is_rejected_before_sending() {
        let url = url::Url::parse("https://api.test/").expect("url");
        let request = Request::<Bytes>::builder(Method::Get, url)
            .header("X-Note", "line\nbreak")
            .build();

        let err = to_http(request).expect_err("invalid header value");
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}
