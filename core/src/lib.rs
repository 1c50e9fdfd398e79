//! Blocking JSON HTTP client over a pooled transport.
//!
//! # Overview
//! Centralizes base-URL handling, optional basic-auth credentials and the
//! JSON `Content-Type`/`Accept` headers, then hands assembled requests to a
//! shared pooled transport. 401 and 404 responses come back as typed errors;
//! everything else is returned for the caller to inspect.
//!
//! # Design
//! - `Configuration` is an immutable value; `Client` owns one plus an
//!   `Arc<dyn Transport>` built once so connections are pooled across calls.
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`),
//!   so a request can be assembled, inspected and dispatched separately.
//! - `RequestBuilder` is an independent fluent way to produce a request.
//! - No retries, no caching, no streaming. Transport failures are returned,
//!   never fatal.

pub mod builder;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod http;
pub mod transport;

pub use builder::RequestBuilder;
pub use client::{create_request, Client};
pub use config::{Configuration, JSON_MEDIA_TYPE};
pub use context::{CancelToken, Context};
pub use error::{Error, Result};
pub use executor::DEFAULT_REQUEST_TIMEOUT;
pub use http::{HttpRequest, HttpResponse, Method};
pub use transport::{Transport, TransportSettings, UreqTransport};
