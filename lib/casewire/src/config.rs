//! Client and API configuration types.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use casewire_core::url_builder::encode_uri;

use crate::navigation::{LogNavigator, Navigator};
use crate::resolver::Resolver;

/// Default route the navigator is sent to on access denial.
pub const DEFAULT_ACCESS_DENIED_ROUTE: &str = "/access-denied";

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout duration.
    pub timeout: Duration,
    /// Connection timeout duration.
    pub connect_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_idle_per_host: usize,
    /// Idle connection timeout.
    pub pool_idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            pool_idle_per_host: self
                .pool_idle_per_host
                .unwrap_or(defaults.pool_idle_per_host),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(defaults.pool_idle_timeout),
        }
    }
}

/// Cookie policy for cross-origin calls.
///
/// It never affects the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Credentials {
    /// Always send cookies.
    #[default]
    Include,
    /// Never send cookies.
    Omit,
    /// Send cookies to the same origin only.
    SameOrigin,
}

impl Credentials {
    /// Policy name as used by browsers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Omit => "omit",
            Self::SameOrigin => "same-origin",
        }
    }
}

/// Path parameter encoder.
pub type PathEncoder = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Headers resolved per request.
pub type HeaderMap = BTreeMap<String, String>;

/// API-level configuration shared by every request.
///
/// Built once and shared behind an [`Arc`]; requests only read it.
#[derive(Clone)]
pub struct ApiConfig {
    base: String,
    version: String,
    with_credentials: bool,
    credentials: Credentials,
    token: Option<Resolver<String>>,
    username: Option<Resolver<String>>,
    password: Option<Resolver<String>>,
    headers: Option<Resolver<HeaderMap>>,
    encode_path: PathEncoder,
    navigator: Arc<dyn Navigator>,
    access_denied_route: String,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base", &self.base)
            .field("version", &self.version)
            .field("with_credentials", &self.with_credentials)
            .field("credentials", &self.credentials)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("headers", &self.headers)
            .field("access_denied_route", &self.access_denied_route)
            .finish_non_exhaustive()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfigBuilder::default().build()
    }
}

impl ApiConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ApiConfigBuilder {
        ApiConfigBuilder::default()
    }

    /// Base URL prepended to every path.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Value substituted for `{api-version}`.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether credentials are sent with requests.
    #[must_use]
    pub const fn with_credentials(&self) -> bool {
        self.with_credentials
    }

    /// Credential policy.
    #[must_use]
    pub const fn credentials(&self) -> Credentials {
        self.credentials
    }

    /// Bearer token resolver.
    #[must_use]
    pub const fn token(&self) -> Option<&Resolver<String>> {
        self.token.as_ref()
    }

    /// Basic-auth user name resolver.
    #[must_use]
    pub const fn username(&self) -> Option<&Resolver<String>> {
        self.username.as_ref()
    }

    /// Basic-auth password resolver.
    #[must_use]
    pub const fn password(&self) -> Option<&Resolver<String>> {
        self.password.as_ref()
    }

    /// Default headers resolver.
    #[must_use]
    pub const fn headers(&self) -> Option<&Resolver<HeaderMap>> {
        self.headers.as_ref()
    }

    /// Encode a path parameter value.
    #[must_use]
    pub fn encode_path(&self, value: &str) -> String {
        (self.encode_path)(value)
    }

    /// Navigator used on access denial.
    #[must_use]
    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    /// Route for access denial.
    #[must_use]
    pub fn access_denied_route(&self) -> &str {
        &self.access_denied_route
    }
}

/// Builder for [`ApiConfig`].
///
/// # Example
///
/// ```
/// use casewire::{ApiConfig, Resolver};
///
/// let config = ApiConfig::builder()
///     .base("https://hope.example.org")
///     .version("2.0")
///     .token(Resolver::from_fn(|_| async { Some("session-token".to_string()) }))
///     .build();
///
/// assert_eq!(config.version(), "2.0");
/// ```
#[derive(Clone, Default)]
pub struct ApiConfigBuilder {
    base: Option<String>,
    version: Option<String>,
    with_credentials: bool,
    credentials: Credentials,
    token: Option<Resolver<String>>,
    username: Option<Resolver<String>>,
    password: Option<Resolver<String>>,
    headers: Option<Resolver<HeaderMap>>,
    encode_path: Option<PathEncoder>,
    navigator: Option<Arc<dyn Navigator>>,
    access_denied_route: Option<String>,
}

impl fmt::Debug for ApiConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfigBuilder")
            .field("base", &self.base)
            .field("version", &self.version)
            .field("with_credentials", &self.with_credentials)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl ApiConfigBuilder {
    /// Set the base URL.
    #[must_use]
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Set the API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Opt in to sending credentials.
    #[must_use]
    pub const fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = with_credentials;
        self
    }

    /// Set the credential policy.
    #[must_use]
    pub const fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the bearer token.
    #[must_use]
    pub fn token(mut self, token: impl Into<Resolver<String>>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the basic-auth user name.
    #[must_use]
    pub fn username(mut self, username: impl Into<Resolver<String>>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the basic-auth password.
    #[must_use]
    pub fn password(mut self, password: impl Into<Resolver<String>>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the default headers.
    #[must_use]
    pub fn headers(mut self, headers: Resolver<HeaderMap>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Set the path parameter encoder.
    #[must_use]
    pub fn encode_path(mut self, encode: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.encode_path = Some(Arc::new(encode));
        self
    }

    /// Set the access-denied navigator.
    #[must_use]
    pub fn navigator(mut self, navigator: impl Navigator + 'static) -> Self {
        self.navigator = Some(Arc::new(navigator));
        self
    }

    /// Set the access-denied route.
    #[must_use]
    pub fn access_denied_route(mut self, route: impl Into<String>) -> Self {
        self.access_denied_route = Some(route.into());
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ApiConfig {
        let encode_path: PathEncoder = match self.encode_path {
            Some(encode_path) => encode_path,
            None => Arc::new(encode_uri),
        };
        let navigator: Arc<dyn Navigator> = match self.navigator {
            Some(navigator) => navigator,
            None => Arc::new(LogNavigator),
        };
        ApiConfig {
            base: self.base.unwrap_or_default(),
            version: self.version.unwrap_or_else(|| "1.0".to_string()),
            with_credentials: self.with_credentials,
            credentials: self.credentials,
            token: self.token,
            username: self.username,
            password: self.password,
            headers: self.headers,
            encode_path,
            navigator,
            access_denied_route: self
                .access_denied_route
                .unwrap_or_else(|| DEFAULT_ACCESS_DENIED_ROUTE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use casewire_core::url_builder::encode_uri_component;

    use super::*;

    #[test]
    fn default_client_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.pool_idle_per_host, 32);
    }

    #[test]
    fn client_builder_overrides() {
        let config = ClientConfig::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(15))
            .build();

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(15));
        assert_eq!(config.pool_idle_per_host, 32);
    }

    #[test]
    fn default_api_config() {
        let config = ApiConfig::default();
        assert_eq!(config.base(), "");
        assert_eq!(config.version(), "1.0");
        assert!(!config.with_credentials());
        assert_eq!(config.credentials(), Credentials::Include);
        assert!(config.token().is_none());
        assert_eq!(config.encode_path("a b/c"), "a%20b/c");
        assert_eq!(config.access_denied_route(), "/access-denied");
    }

    #[test]
    fn custom_encoder() {
        let config = ApiConfig::builder().encode_path(encode_uri_component).build();
        assert_eq!(config.encode_path("a/b"), "a%2Fb");
    }

    #[test]
    fn credentials_policy() {
        let omit = ApiConfig::builder()
            .with_credentials(true)
            .credentials(Credentials::Omit)
            .build();
        assert!(omit.with_credentials());
        assert_eq!(omit.credentials(), Credentials::Omit);
        assert_eq!(omit.credentials().as_str(), "omit");
        assert_eq!(Credentials::SameOrigin.as_str(), "same-origin");
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = ApiConfig::builder()
            .token("very-secret")
            .password("hunter2")
            .build();
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
