//! Client-side navigation on access denial.

use serde_json::Value;
use tracing::info;

/// `detail` sent by the API when the session is simply missing.
///
/// Such a 403 is left to the login flow instead of the access-denied page.
pub const AUTH_NOT_PROVIDED: &str = "Authentication credentials were not provided.";

/// Receives client-side navigation requests.
///
/// Any `Fn(&str)` closure is a navigator.
pub trait Navigator: Send + Sync {
    /// Navigate to the given route.
    fn navigate(&self, route: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, route: &str) {
        self(route);
    }
}

/// Navigator that only records the navigation in the logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "navigating after access denial");
    }
}

/// Whether a response should send the user to the access-denied route.
///
/// `raw` is the response body before any key transcoding.
#[must_use]
pub fn is_access_denied(status: u16, raw: Option<&Value>) -> bool {
    if status != 403 {
        return false;
    }
    let detail = raw.and_then(|body| body.get("detail")).and_then(Value::as_str);
    detail != Some(AUTH_NOT_PROVIDED)
}
