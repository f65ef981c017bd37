//! API client facade.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::request::{CancelableRequest, request};
use crate::{HttpClient, RequestDescriptor, Result};

/// Transport plus API configuration.
///
/// Cloning is cheap: the configuration is shared, and the transport is
/// expected to share its connection pool.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> casewire::Result<()> {
/// use casewire::{ApiClient, ApiConfig, HyperClient, Method, RequestDescriptor};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Household {
///     unicef_id: String,
///     size: u32,
/// }
///
/// let api = ApiClient::new(
///     HyperClient::new(),
///     ApiConfig::builder().base("https://hope.example.org").build(),
/// );
/// let descriptor = RequestDescriptor::builder(Method::Get, "/api/rest/households/{id}/")
///     .path("id", "HH-20-0000.0001")
///     .build();
/// let household: Household = api.fetch(descriptor).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ApiClient<C> {
    client: C,
    config: Arc<ApiConfig>,
}

impl<C: Clone> Clone for ApiClient<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C> ApiClient<C> {
    /// Create a client owning its configuration.
    #[must_use]
    pub fn new(client: C, config: ApiConfig) -> Self {
        Self::with_shared_config(client, Arc::new(config))
    }

    /// Create a client sharing an existing configuration.
    #[must_use]
    pub const fn with_shared_config(client: C, config: Arc<ApiConfig>) -> Self {
        Self { client, config }
    }

    /// API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Get a reference to the inner HTTP client.
    #[must_use]
    pub const fn inner(&self) -> &C {
        &self.client
    }

    /// Consume the wrapper and return the inner HTTP client.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.client
    }
}

impl<C> ApiClient<C>
where
    C: HttpClient + Clone + 'static,
{
    /// Start a cancellable call.
    pub fn request(&self, descriptor: RequestDescriptor) -> CancelableRequest {
        request(self.client.clone(), Arc::clone(&self.config), descriptor)
    }

    /// Call and deserialize the camel-cased body into `T`.
    ///
    /// A missing body deserializes from `null`.
    ///
    /// # Errors
    ///
    /// Returns the call error, or a path-aware deserialization error.
    pub async fn fetch<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T> {
        let body = self.request(descriptor).await?;
        casewire_core::from_value(body.unwrap_or(Value::Null))
    }
}
