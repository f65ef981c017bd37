//! Plain-data description of one API call.
//!
//! # Example
//!
//! ```
//! use casewire_core::{Method, RequestDescriptor};
//! use serde_json::json;
//!
//! let template = "/api/rest/{business_area_slug}/households/";
//! let descriptor = RequestDescriptor::builder(Method::Get, template)
//!     .path("business_area_slug", "afghanistan")
//!     .query("page", 2)
//!     .error(404, "Household not found")
//!     .build();
//!
//! assert_eq!(descriptor.query().map(|q| q["page"].clone()), Some(json!(2)));
//! ```

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::case::underscore_request;
use crate::{Blob, Form, FormValue, Method, RequestBody};

/// Method, templated URL, parameters, body and error overrides of a call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    url: String,
    path: Map<String, Value>,
    query: Option<Map<String, Value>>,
    headers: BTreeMap<String, Option<String>>,
    form_data: Option<FormValue>,
    body: Option<RequestBody>,
    media_type: Option<String>,
    response_header: Option<String>,
    errors: BTreeMap<u16, String>,
}

impl RequestDescriptor {
    /// Creates a new [`RequestDescriptorBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: impl Into<String>) -> RequestDescriptorBuilder {
        RequestDescriptorBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// URL template, with `{name}` placeholders.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path parameters.
    #[must_use]
    pub const fn path(&self) -> &Map<String, Value> {
        &self.path
    }

    /// Query parameters, if any were given.
    #[must_use]
    pub const fn query(&self) -> Option<&Map<String, Value>> {
        self.query.as_ref()
    }

    /// Per-request headers; `None` values are dropped when sending.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, Option<String>> {
        &self.headers
    }

    /// Structured multipart payload.
    #[must_use]
    pub const fn form_data(&self) -> Option<&FormValue> {
        self.form_data.as_ref()
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Declared media type.
    #[must_use]
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// Response header returned instead of the body.
    #[must_use]
    pub fn response_header(&self) -> Option<&str> {
        self.response_header.as_deref()
    }

    /// Per-status error messages.
    #[must_use]
    pub const fn errors(&self) -> &BTreeMap<u16, String> {
        &self.errors
    }

    /// Copy of this descriptor with a JSON body snake-cased for the wire.
    ///
    /// Text, blob and multipart bodies are left as they are.
    #[must_use]
    pub fn to_wire(&self) -> Self {
        let mut wire = self.clone();
        if let Some(RequestBody::Json(value)) = &self.body {
            wire.body = Some(RequestBody::Json(underscore_request(value)));
        }
        wire
    }
}

/// Builder for [`RequestDescriptor`].
#[derive(Debug, Clone)]
pub struct RequestDescriptorBuilder {
    descriptor: RequestDescriptor,
}

impl RequestDescriptorBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            descriptor: RequestDescriptor {
                method,
                url: url.into(),
                path: Map::new(),
                query: None,
                headers: BTreeMap::new(),
                form_data: None,
                body: None,
                media_type: None,
                response_header: None,
                errors: BTreeMap::new(),
            },
        }
    }

    /// Sets a path parameter.
    #[must_use]
    pub fn path(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.descriptor.path.insert(name.into(), value.into());
        self
    }

    /// Sets a query parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.descriptor
            .query
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// Replaces all query parameters.
    #[must_use]
    pub fn query_map(mut self, query: Map<String, Value>) -> Self {
        self.descriptor.query = Some(query);
        self
    }

    /// Sets a header, replacing any with the same name (ignoring case).
    #[must_use]
    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.optional_header(name, Some(value.into()))
    }

    /// Sets a header that may be absent; absent headers are not sent.
    #[must_use]
    pub fn optional_header(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        let name = name.into();
        self.descriptor
            .headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.descriptor.headers.insert(name, value);
        self
    }

    /// Sets the structured multipart payload.
    #[must_use]
    pub fn form_data(mut self, value: impl Into<FormValue>) -> Self {
        self.descriptor.form_data = Some(value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.descriptor.body = Some(body);
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn json(self, value: impl Into<Value>) -> Self {
        self.body(RequestBody::Json(value.into()))
    }

    /// Sets a JSON body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json_from<T: serde::Serialize>(self, value: &T) -> crate::Result<Self> {
        let value = serde_json::to_value(value)?;
        Ok(self.json(value))
    }

    /// Sets a text body.
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.body(RequestBody::Text(text.into()))
    }

    /// Sets a binary body.
    #[must_use]
    pub fn blob(self, blob: Blob) -> Self {
        self.body(RequestBody::Blob(blob))
    }

    /// Sets a pre-built multipart body.
    #[must_use]
    pub fn multipart(self, form: Form) -> Self {
        self.body(RequestBody::Multipart(form))
    }

    /// Declares the body media type.
    #[must_use]
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.descriptor.media_type = Some(media_type.into());
        self
    }

    /// Returns the named response header instead of the body.
    #[must_use]
    pub fn response_header(mut self, name: impl Into<String>) -> Self {
        self.descriptor.response_header = Some(name.into());
        self
    }

    /// Overrides the error message for a status code.
    #[must_use]
    pub fn error(mut self, status: u16, message: impl Into<String>) -> Self {
        self.descriptor.errors.insert(status, message.into());
        self
    }

    /// Builds the [`RequestDescriptor`].
    #[must_use]
    pub fn build(self) -> RequestDescriptor {
        self.descriptor
    }
}
