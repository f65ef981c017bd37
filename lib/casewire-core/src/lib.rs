//! Core types for the casewire REST marshalling layer.
//!
//! This crate holds everything that does not need a runtime:
//! - [`case`] - camelCase/snake_case key transcoding
//! - [`FormValue`] and [`Blob`] - payload values that may carry files
//! - [`encode_form_data`] - structural multipart encoding into a [`Form`]
//! - [`url_builder`] - templated paths and query strings
//! - [`RequestDescriptor`] - plain-data description of an API call
//! - [`build_body`] and [`request_content_type`] - body serialization
//! - [`Request`], [`Response`] and [`CamelizedResponse`] - transport types
//! - [`Error`], [`ApiError`] and [`classify`] - error handling
//! - [`HttpClient`] - transport trait

mod body;
pub mod case;
mod client;
mod descriptor;
mod error;
mod form_data;
mod method;
mod multipart;
pub mod prelude;
mod request;
mod response;
pub mod url_builder;
mod value;

pub use body::{
    ContentType, RawBody, RequestBody, build_body, from_json, from_value, is_json_content_type,
    request_content_type,
};
pub use client::HttpClient;
pub use descriptor::{RequestDescriptor, RequestDescriptorBuilder};
pub use error::{ApiError, DEFAULT_ERROR_MESSAGES, Error, Result, classify};
pub use form_data::encode_form_data;
pub use method::Method;
pub use multipart::{Form, FormEntry, Part};
pub use request::{Request, RequestBuilder};
pub use response::{ApiResult, CamelizedResponse, Response};
pub use value::{Blob, FormValue};

pub use http::{StatusCode, header};
