//! Error types for the resty client.
//!
//! # Design
//! `Unauthorized` and `NotFound` get dedicated variants because callers
//! frequently branch on "log in again" and "the resource does not exist".
//! Every other non-2xx status passes through the executor as a response;
//! callers that want those classified too opt in with
//! `HttpResponse::error_for_status`, which produces `Remote`.
//!
//! Transport failures (DNS, refused connections, timeouts) are ordinary
//! variants. Nothing here aborts the host process.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by `Client`, `RequestBuilder` and `HttpResponse` helpers.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be constructed (malformed URL, missing method).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The deadline expired before or while the request was in flight.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The caller cancelled the request before it was dispatched.
    #[error("request to {url} was cancelled")]
    Cancelled { url: String },

    /// Connection-level failure reported by the transport.
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// The server returned 401.
    #[error("{message}")]
    Unauthorized { message: String, url: String },

    /// The server returned 404.
    #[error("{message}")]
    NotFound { message: String, url: String },

    /// Any other classified non-success status.
    #[error("{status}: ({url})")]
    Remote { host: String, status: u16, url: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl Error {
    pub(crate) fn unauthorized(url: &str) -> Self {
        Error::Unauthorized {
            message: "Authentication required.".to_string(),
            url: url.to_string(),
        }
    }

    pub(crate) fn not_found(url: &str) -> Self {
        Error::NotFound {
            message: "Resource not found.".to_string(),
            url: url.to_string(),
        }
    }

    /// The URL the failing request targeted, when the error carries one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Timeout { url }
            | Error::Cancelled { url }
            | Error::Transport { url, .. }
            | Error::Unauthorized { url, .. }
            | Error::NotFound { url, .. }
            | Error::Remote { url, .. } => Some(url),
            Error::InvalidRequest(_) | Error::Serialization(_) | Error::Deserialization(_) => None,
        }
    }

    /// HTTP status behind a classified error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized { .. } => Some(401),
            Error::NotFound { .. } => Some(404),
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
