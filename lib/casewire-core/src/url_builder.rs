//! URL assembly from templated paths and query parameters.
//!
//! # Example
//!
//! ```
//! use casewire_core::url_builder::{build_url, encode_uri};
//! use casewire_core::{Method, RequestDescriptor};
//! use serde_json::json;
//!
//! let descriptor = RequestDescriptor::builder(Method::Get, "/api/rest/{slug}/programs/")
//!     .path("slug", "south sudan")
//!     .query("status", json!(["ACTIVE", "DRAFT"]))
//!     .build();
//!
//! assert_eq!(
//!     build_url("https://hope.example.org", "1.0", &encode_uri, &descriptor),
//!     "https://hope.example.org/api/rest/south%20sudan/programs/?status=ACTIVE&status=DRAFT"
//! );
//! ```

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Value};

use crate::RequestDescriptor;
use crate::value::value_to_string;

/// Bytes escaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Bytes escaped by `encodeURI`: reserved characters stay as they are.
const URI: &AsciiSet = &URI_COMPONENT
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'#');

/// Placeholder replaced by the configured API version.
const API_VERSION_PLACEHOLDER: &str = "{api-version}";

/// Percent-encode like `encodeURI`.
#[must_use]
pub fn encode_uri(value: &str) -> String {
    utf8_percent_encode(value, URI).to_string()
}

/// Percent-encode like `encodeURIComponent`.
#[must_use]
pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Resolve the full request URL.
///
/// Placeholders without a matching path parameter are left untouched.
#[must_use]
pub fn build_url(
    base: &str,
    version: &str,
    encode_path: &dyn Fn(&str) -> String,
    descriptor: &RequestDescriptor,
) -> String {
    let template = descriptor.url().replacen(API_VERSION_PLACEHOLDER, version, 1);
    let path = substitute_path(&template, descriptor.path(), encode_path);

    let mut url = format!("{base}{path}");
    if let Some(query) = descriptor.query() {
        url.push_str(&query_string(query));
    }
    url
}

fn substitute_path(
    template: &str,
    params: &Map<String, Value>,
    encode_path: &dyn Fn(&str) -> String,
) -> String {
    let mut path = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let (before, placeholder) = rest.split_at(start);
        let Some(end) = placeholder.find('}') else {
            break;
        };
        path.push_str(before);

        let name = placeholder.get(1..end).unwrap_or_default();
        match params.get(name) {
            Some(value) => {
                let value = value_to_string(value).unwrap_or_else(|| "null".to_string());
                path.push_str(&encode_path(&value));
            }
            None => path.push_str(placeholder.get(..=end).unwrap_or_default()),
        }
        rest = placeholder.get(end + 1..).unwrap_or_default();
    }

    path.push_str(rest);
    path
}

/// Build a `?`-prefixed query string; empty when nothing is emitted.
///
/// Arrays repeat their key, objects nest as `key[child]`, nulls are skipped.
#[must_use]
pub fn query_string(params: &Map<String, Value>) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        collect_pairs(&mut pairs, key, value);
    }

    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

fn collect_pairs(pairs: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                collect_pairs(pairs, key, item);
            }
        }
        Value::Object(fields) => {
            for (child, item) in fields {
                collect_pairs(pairs, &format!("{key}[{child}]"), item);
            }
        }
        scalar => {
            let value = value_to_string(scalar).unwrap_or_default();
            pairs.push(format!(
                "{}={}",
                encode_uri_component(key),
                encode_uri_component(&value)
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Method;

    fn url_for(descriptor: &RequestDescriptor) -> String {
        build_url("https://api.test", "2.1", &encode_uri, descriptor)
    }

    #[test]
    fn encoders_match_javascript() {
        assert_eq!(encode_uri_component("a b&c/d?é"), "a%20b%26c%2Fd%3F%C3%A9");
        assert_eq!(encode_uri_component("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(encode_uri("a b/c?d=e#f"), "a%20b/c?d=e#f");
    }

    #[test]
    fn path_substitution() {
        let template = "/api/{api-version}/households/{id}/members/{member}";
        let descriptor = RequestDescriptor::builder(Method::Get, template)
            .path("id", "HH 1")
            .path("member", 7)
            .build();
        assert_eq!(url_for(&descriptor), "https://api.test/api/2.1/households/HH%201/members/7");
    }

    #[test]
    fn unmatched_placeholders_are_kept() {
        let descriptor = RequestDescriptor::builder(Method::Get, "/a/{missing}/b/{open")
            .build();
        assert_eq!(url_for(&descriptor), "https://api.test/a/{missing}/b/{open");
    }

    #[test]
    fn custom_path_encoder() {
        let descriptor = RequestDescriptor::builder(Method::Get, "/files/{name}")
            .path("name", "a/b")
            .build();
        let url = build_url("", "1", &encode_uri_component, &descriptor);
        assert_eq!(url, "/files/a%2Fb");
    }

    #[test]
    fn query_arrays_repeat_keys() {
        let mut query = Map::new();
        query.insert("status".to_string(), json!(["OPEN", "CLOSED"]));
        query.insert("page".to_string(), json!(3));
        assert_eq!(query_string(&query), "?status=OPEN&status=CLOSED&page=3");
    }

    #[test]
    fn query_nested_objects_use_brackets() {
        let mut query = Map::new();
        query.insert("filter".to_string(), json!({ "admin": { "level": 2 }, "active": true }));
        assert_eq!(
            query_string(&query),
            "?filter%5Badmin%5D%5Blevel%5D=2&filter%5Bactive%5D=true"
        );
    }

    #[test]
    fn query_skips_nulls_and_encodes() {
        let mut query = Map::new();
        query.insert("search".to_string(), json!("Jane Doe & co"));
        query.insert("program".to_string(), Value::Null);
        query.insert("ids".to_string(), json!([1, null, 2]));
        assert_eq!(query_string(&query), "?search=Jane%20Doe%20%26%20co&ids=1&ids=2");
    }

    #[test]
    fn empty_query_adds_nothing() {
        let descriptor = RequestDescriptor::builder(Method::Get, "/x")
            .query_map(Map::new())
            .build();
        assert_eq!(url_for(&descriptor), "https://api.test/x");

        let mut only_nulls = Map::new();
        only_nulls.insert("a".to_string(), Value::Null);
        assert_eq!(query_string(&only_nulls), "");
    }
}
