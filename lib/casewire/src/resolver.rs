//! Values that are either fixed or computed per request.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::RequestDescriptor;

type ResolveFn<T> = dyn Fn(&RequestDescriptor) -> BoxFuture<'static, Option<T>> + Send + Sync;

/// A configuration value resolved for each request.
///
/// # Example
///
/// ```
/// use casewire::Resolver;
///
/// let fixed: Resolver<String> = Resolver::value("secret".to_string());
/// let dynamic: Resolver<String> = Resolver::from_fn(|descriptor| {
///     let scoped = descriptor.url().starts_with("/api/rest/");
///     async move { scoped.then(|| "scoped-token".to_string()) }
/// });
/// # let _ = (fixed, dynamic);
/// ```
pub enum Resolver<T> {
    /// Same value for every request.
    Value(T),
    /// Computed from the request being built.
    Dynamic(Arc<ResolveFn<T>>),
}

impl<T> Resolver<T> {
    /// Fixed value.
    #[must_use]
    pub const fn value(value: T) -> Self {
        Self::Value(value)
    }

    /// Async function of the request descriptor.
    ///
    /// The descriptor is only borrowed while the future is created; capture
    /// what you need from it before the `async` block.
    #[must_use]
    pub fn from_fn<F, Fut>(resolve: F) -> Self
    where
        T: 'static,
        F: Fn(&RequestDescriptor) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<T>> + Send + 'static,
    {
        Self::Dynamic(Arc::new(
            move |descriptor: &RequestDescriptor| -> BoxFuture<'static, Option<T>> {
                Box::pin(resolve(descriptor))
            },
        ))
    }
}

impl<T: Clone + Send + 'static> Resolver<T> {
    /// Resolve for the given request.
    pub async fn resolve(&self, descriptor: &RequestDescriptor) -> Option<T> {
        match self {
            Self::Value(value) => Some(value.clone()),
            Self::Dynamic(resolve) => resolve(descriptor).await,
        }
    }
}

impl<T: Clone> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Value(value) => Self::Value(value.clone()),
            Self::Dynamic(resolve) => Self::Dynamic(Arc::clone(resolve)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for Resolver<String> {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<String> for Resolver<String> {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

/// Resolve an optional resolver, treating a missing one as no value.
pub(crate) async fn resolve_optional<T: Clone + Send + 'static>(
    resolver: Option<&Resolver<T>>,
    descriptor: &RequestDescriptor,
) -> Option<T> {
    match resolver {
        Some(resolver) => resolver.resolve(descriptor).await,
        None => None,
    }
}
