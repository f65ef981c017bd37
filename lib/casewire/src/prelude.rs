//! Prelude module for convenient imports.
//!
//! ```ignore
//! use casewire::prelude::*;
//! ```

pub use crate::{
    ApiClient, ApiConfig, Blob, CancelableRequest, ClientConfig, Credentials, Error, FormValue,
    HttpClient, HyperClient, Method, Navigator, RequestDescriptor, Resolver, Result, StatusCode,
};
pub use serde::{Deserialize, Serialize};
