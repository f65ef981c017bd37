//! Async REST marshalling for case-management APIs.
//!
//! Callers describe a call as a [`RequestDescriptor`]. The client resolves
//! credentials and headers, snake-cases JSON bodies, flattens structured
//! payloads into multipart forms, sends the call with cooperative
//! cancellation, camel-cases the response, and classifies failures.
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> casewire::Result<()> {
//! use casewire::prelude::*;
//! use serde_json::json;
//!
//! let api = ApiClient::new(
//!     HyperClient::builder().with_logging().build(),
//!     ApiConfig::builder()
//!         .base("https://hope.example.org")
//!         .token(Resolver::from_fn(|_| async { Some("session-token".to_string()) }))
//!         .build(),
//! );
//!
//! let descriptor = RequestDescriptor::builder(Method::Post, "/api/rest/{slug}/grievance-tickets/")
//!     .path("slug", "afghanistan")
//!     .json(json!({ "issueType": 2, "householdUnicefId": "HH-1" }))
//!     .error(409, "Ticket already exists")
//!     .build();
//!
//! let ticket = api.request(descriptor).await?;
//! # let _ = ticket;
//! # Ok(())
//! # }
//! ```

mod api_client;
mod client;
mod config;
mod connector;
mod headers;
pub mod middleware;
mod navigation;
pub mod prelude;
mod request;
mod resolver;

pub use api_client::ApiClient;
pub use client::{HyperClient, HyperClientBuilder};
pub use config::{
    ApiConfig, ApiConfigBuilder, ClientConfig, ClientConfigBuilder, Credentials,
    DEFAULT_ACCESS_DENIED_ROUTE, HeaderMap, PathEncoder,
};
pub use headers::build_headers;
pub use navigation::{AUTH_NOT_PROVIDED, LogNavigator, Navigator, is_access_denied};
pub use request::{CancelableRequest, request, send_request};
pub use resolver::Resolver;

pub use tokio_util::sync::CancellationToken;
pub use tower;

pub use casewire_core::{
    ApiError, ApiResult, Blob, CamelizedResponse, ContentType, Error, Form, FormEntry, FormValue,
    HttpClient, Method, Part, RawBody, Request, RequestBody, RequestBuilder, RequestDescriptor,
    RequestDescriptorBuilder, Response, Result, StatusCode, build_body, case, classify,
    encode_form_data, from_json, from_value, header, url_builder,
};
