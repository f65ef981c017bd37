//! Payload values that may carry binary files.
//!
//! [`FormValue`] is a JSON-like tree with one extra leaf kind, [`Blob`], so
//! uploads can sit anywhere inside a structured multipart payload.

use std::num::FpCategory;

use bytes::Bytes;
use serde_json::{Number, Value};

use crate::multipart::guess_content_type;

/// A binary payload with optional file name and MIME type.
///
/// Cloning a blob shares its buffer; see [`Blob::same_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    data: Bytes,
    file_name: Option<String>,
    mime_type: Option<String>,
}

impl Blob {
    /// Create a blob without name or MIME type.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            file_name: None,
            mime_type: None,
        }
    }

    /// Create a named file; the MIME type is guessed from the extension.
    #[must_use]
    pub fn file(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let mime_type = guess_content_type(&file_name);
        Self {
            data: data.into(),
            file_name: Some(file_name),
            mime_type: Some(mime_type),
        }
    }

    /// Set the file name.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Set the MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Raw content.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// File name, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// MIME type, if known.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Content length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the blob holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether both blobs point at the same buffer, not just equal bytes.
    #[must_use]
    pub fn same_data(&self, other: &Bytes) -> bool {
        self.data.as_ptr() == other.as_ptr() && self.data.len() == other.len()
    }
}

/// JSON-like value tree whose leaves may be files.
///
/// Object fields keep their insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormValue {
    /// Absent value; never encoded.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(Number),
    /// String.
    String(String),
    /// Ordered list.
    Array(Vec<FormValue>),
    /// Ordered fields.
    Object(Vec<(String, FormValue)>),
    /// Binary file.
    File(Blob),
}

impl FormValue {
    /// Build an object from `(name, value)` pairs.
    #[must_use]
    pub fn object<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Self>,
    {
        Self::Object(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    /// Build an array.
    #[must_use]
    pub fn array<V: Into<Self>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// Whether this is [`FormValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Value> for FormValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(number) => Self::Number(number),
            Value::String(text) => Self::String(text),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(fields) => Self::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Blob> for FormValue {
    fn from(blob: Blob) -> Self {
        Self::File(blob)
    }
}

impl From<bool> for FormValue {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        Self::String(text.to_string())
    }
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        Self::String(text)
    }
}

impl From<i64> for FormValue {
    fn from(number: i64) -> Self {
        Self::Number(number.into())
    }
}

impl From<u64> for FormValue {
    fn from(number: u64) -> Self {
        Self::Number(number.into())
    }
}

impl From<f64> for FormValue {
    fn from(number: f64) -> Self {
        Number::from_f64(number).map_or(Self::Null, Self::Number)
    }
}

impl<T: Into<Self>> From<Option<T>> for FormValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for FormValue {
    fn from(items: Vec<T>) -> Self {
        Self::array(items)
    }
}

/// Render a number the way JavaScript's `String(n)` does for finite values.
#[must_use]
pub fn number_to_string(number: &Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() => float_to_string(float),
        _ => number.to_string(),
    }
}

/// Plain digits in `[1e-6, 1e21)`, exponent form with an explicit sign outside.
fn float_to_string(float: f64) -> String {
    if float.classify() == FpCategory::Zero {
        return "0".to_string();
    }

    let magnitude = float.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return float.to_string();
    }

    let exponent_form = format!("{float:e}");
    match exponent_form.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => exponent_form,
    }
}

/// Render a scalar JSON value as text; `None` for null.
///
/// Arrays are comma-joined and objects are serialized as JSON.
#[must_use]
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number_to_string(number)),
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| value_to_string(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn blob_file_guesses_mime_type() {
        let blob = Blob::file("consent.pdf", vec![0x25, 0x50]);
        assert_eq!(blob.file_name(), Some("consent.pdf"));
        assert_eq!(blob.mime_type(), Some("application/pdf"));
        assert_eq!(blob.len(), 2);
    }

    #[test]
    fn blob_clone_shares_buffer() {
        let blob = Blob::new(vec![1, 2, 3]);
        let copy = blob.clone();
        assert!(blob.same_data(copy.data()));
        assert!(!blob.same_data(&Bytes::from(vec![1, 2, 3])));
    }

    #[test]
    fn from_json_keeps_order() {
        let value = FormValue::from(json!({ "zeta": 1, "alpha": [true, null] }));
        assert_eq!(
            value,
            FormValue::object([
                ("zeta", FormValue::from(1_i64)),
                (
                    "alpha",
                    FormValue::Array(vec![FormValue::Bool(true), FormValue::Null])
                ),
            ])
        );
    }

    #[test]
    fn option_and_nan_become_null() {
        assert!(FormValue::from(None::<String>).is_null());
        assert!(FormValue::from(f64::NAN).is_null());
    }

    #[test]
    fn numbers_render_like_javascript() {
        assert_eq!(number_to_string(&Number::from(42)), "42");
        assert_eq!(number_to_string(&Number::from(-7)), "-7");
        let whole = Number::from_f64(3.0).expect("finite");
        assert_eq!(number_to_string(&whole), "3");
        let fraction = Number::from_f64(1.5).expect("finite");
        assert_eq!(number_to_string(&fraction), "1.5");
    }

    #[test]
    fn numbers_switch_to_exponent_form_like_javascript() {
        let render = |float: f64| number_to_string(&Number::from_f64(float).expect("finite"));

        assert_eq!(render(1e21), "1e+21");
        assert_eq!(render(-2.5e22), "-2.5e+22");
        assert_eq!(render(1e-7), "1e-7");
        assert_eq!(render(1.5e-7), "1.5e-7");
        assert_eq!(render(1e20), "100000000000000000000");
        assert_eq!(render(0.000_001), "0.000001");
        assert_eq!(render(-0.0), "0");
    }

    #[test]
    fn scalar_rendering() {
        assert_eq!(value_to_string(&json!(null)), None);
        assert_eq!(value_to_string(&json!(false)), Some("false".to_string()));
        assert_eq!(value_to_string(&json!("a b")), Some("a b".to_string()));
        assert_eq!(value_to_string(&json!([1, "x"])), Some("1,x".to_string()));
        assert_eq!(
            value_to_string(&json!({ "a": 1 })),
            Some(r#"{"a":1}"#.to_string())
        );
    }
}
