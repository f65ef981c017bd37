//! Request header assembly.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use casewire_core::{ContentType, RequestDescriptor, request_content_type};

use crate::config::ApiConfig;
use crate::resolver::resolve_optional;

/// Build the headers for a request.
///
/// Later sources win over earlier ones, ignoring name case: the
/// `Accept: application/json` default, then the configured headers, then the
/// descriptor headers. A descriptor header without a value removes the name.
pub async fn build_headers(
    config: &ApiConfig,
    descriptor: &RequestDescriptor,
) -> HashMap<String, String> {
    let (token, username, password, defaults) = tokio::join!(
        resolve_optional(config.token(), descriptor),
        resolve_optional(config.username(), descriptor),
        resolve_optional(config.password(), descriptor),
        resolve_optional(config.headers(), descriptor),
    );

    let mut headers = Headers::default();
    headers.set("Accept", Some(ContentType::Json.as_str().to_string()));
    for (name, value) in defaults.unwrap_or_default() {
        headers.set(&name, Some(value));
    }
    for (name, value) in descriptor.headers() {
        headers.set(name, value.clone());
    }

    if let Some(authorization) = authorization(token, username, password) {
        headers.set("Authorization", Some(authorization));
    }

    if let Some(content_type) = request_content_type(descriptor) {
        headers.set("Content-Type", Some(content_type));
    }

    headers.into_map()
}

fn authorization(
    token: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Option<String> {
    if let Some(token) = token.filter(|token| !token.is_empty()) {
        return Some(format!("Bearer {token}"));
    }
    match (username, password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            let credentials = STANDARD.encode(format!("{username}:{password}"));
            Some(format!("Basic {credentials}"))
        }
        _ => None,
    }
}

/// Ordered header list with case-insensitive names.
#[derive(Debug, Default)]
struct Headers(Vec<(String, String)>);

impl Headers {
    fn set(&mut self, name: &str, value: Option<String>) {
        self.0.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        if let Some(value) = value {
            self.0.push((name.to_string(), value));
        }
    }

    fn into_map(self) -> HashMap<String, String> {
        self.0.into_iter().collect()
    }
}
