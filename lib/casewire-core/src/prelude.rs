//! Prelude module for convenient imports.
//!
//! ```ignore
//! use casewire_core::prelude::*;
//! ```

pub use crate::{
    ApiError, ApiResult, Blob, CamelizedResponse, ContentType, Error, Form, FormValue, HttpClient,
    Method, Part, Request, RequestBuilder, RequestDescriptor, Response, Result, classify,
    encode_form_data, from_json,
};
