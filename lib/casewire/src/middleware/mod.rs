//! Tower middleware layers for the casewire transport.
//!
//! Layers wrap [`HyperClient`](crate::HyperClient) through
//! [`HyperClientBuilder::layer`](crate::HyperClientBuilder::layer); the last
//! layer added is the first to see a request.
//!
//! - [`LoggingLayer`] - logs requests/responses using `tracing`

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};
