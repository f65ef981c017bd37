//! Key-case transcoding between client (camelCase) and wire (snake_case) names.
//!
//! The generic rule splits on lower→upper, letter→digit and digit→letter
//! boundaries. Age-bracket fragments such as `0_5` or `18_59` do not follow
//! that rule, so they are fixed up from an explicit allow-list afterwards.
//!
//! # Example
//!
//! ```
//! use casewire_core::case::{to_camel, to_snake};
//!
//! assert_eq!(to_snake("maleAgeGroup05Count"), "male_age_group_0_5_count");
//! assert_eq!(to_camel("male_age_group_0_5_count"), "maleAgeGroup05Count");
//! ```

use convert_case::{Boundary, Case, Converter};
use serde_json::{Map, Value};

/// Numeric segments rewritten after the generic split, as `(split, wire)`.
///
/// Only whole `_`-delimited segments that are not the first one match.
const AGE_BRACKETS: &[(&str, &str)] = &[
    ("05", "0_5"),
    ("611", "6_11"),
    ("1217", "12_17"),
    ("1859", "18_59"),
    ("60", "60"),
];

/// Word boundaries of a client-side identifier.
const CLIENT_BOUNDARIES: &[Boundary] = &[
    Boundary::UNDERSCORE,
    Boundary::LOWER_UPPER,
    Boundary::LOWER_DIGIT,
    Boundary::UPPER_DIGIT,
    Boundary::DIGIT_LOWER,
    Boundary::DIGIT_UPPER,
];

/// Response keys kept verbatim next to their camelCase form.
pub const INBOUND_DUAL_KEYS: &[&str] = &["pdu_fields", "flex_fields"];

/// Request keys kept verbatim next to their snake_case form.
pub const OUTBOUND_DUAL_KEYS: &[&str] = &["pduFields"];

/// Convert a single identifier to snake_case.
#[must_use]
pub fn to_snake(token: &str) -> String {
    let (leading, rest) = split_leading_underscores(token);
    let snake = Converter::new()
        .set_boundaries(CLIENT_BOUNDARIES)
        .to_case(Case::Snake)
        .convert(rest);

    format!("{leading}{}", apply_age_brackets(&snake))
}

fn apply_age_brackets(snake: &str) -> String {
    snake
        .split('_')
        .enumerate()
        .map(|(index, segment)| {
            if index == 0 {
                return segment;
            }
            AGE_BRACKETS
                .iter()
                .find(|(split, _)| *split == segment)
                .map_or(segment, |(_, wire)| wire)
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert a single identifier to camelCase.
///
/// Leading underscores are kept. Identifiers without an inner `_` are
/// returned as is.
#[must_use]
pub fn to_camel(token: &str) -> String {
    let (leading, rest) = split_leading_underscores(token);
    if !rest.contains('_') {
        return token.to_string();
    }

    let camel = Converter::new()
        .set_boundaries(&[Boundary::UNDERSCORE])
        .to_case(Case::Camel)
        .convert(rest);

    format!("{leading}{camel}")
}

fn split_leading_underscores(token: &str) -> (&str, &str) {
    let rest = token.trim_start_matches('_');
    token.split_at(token.len() - rest.len())
}

/// Rename every object key of a JSON tree to snake_case.
#[must_use]
pub fn deep_underscore(value: &Value) -> Value {
    rename_keys(value, to_snake, &[])
}

/// Rename every object key of a JSON tree to camelCase.
#[must_use]
pub fn deep_camelize(value: &Value) -> Value {
    rename_keys(value, to_camel, &[])
}

/// Snake-case an outgoing JSON payload.
///
/// Keys listed in [`OUTBOUND_DUAL_KEYS`] are emitted twice: transcoded, and
/// under their original name with the untouched client value.
#[must_use]
pub fn underscore_request(value: &Value) -> Value {
    rename_keys(value, to_snake, OUTBOUND_DUAL_KEYS)
}

/// Camel-case an incoming JSON payload.
///
/// Keys listed in [`INBOUND_DUAL_KEYS`] are emitted twice: transcoded, and
/// under their wire name with the untouched wire value.
#[must_use]
pub fn camelize_response(value: &Value) -> Value {
    rename_keys(value, to_camel, INBOUND_DUAL_KEYS)
}

fn rename_keys(value: &Value, rename: fn(&str) -> String, dual_keys: &[&str]) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| rename_keys(item, rename, dual_keys))
                .collect(),
        ),
        Value::Object(fields) => {
            let mut renamed = Map::with_capacity(fields.len());
            for (key, child) in fields {
                renamed.insert(rename(key), rename_keys(child, rename, dual_keys));
                if dual_keys.contains(&key.as_str()) {
                    renamed.insert(key.clone(), child.clone());
                }
            }
            Value::Object(renamed)
        }
        other => other.clone(),
    }
}
