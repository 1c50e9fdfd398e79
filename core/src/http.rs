//! HTTP request and response values.
//!
//! # Design
//! Requests and responses are plain data. The assembler and the builder
//! produce `HttpRequest` values; a `Transport` turns one into an
//! `HttpResponse`. Keeping both as owned values lets callers inspect a
//! request before dispatching it and lets tests swap the network for a fake.
//!
//! Responses are buffered: the body is read to completion by the transport.

use serde::de::DeserializeOwned;
use strum::{AsRefStr, Display};
use url::Url;

use crate::context::Context;
use crate::error::{Error, Result};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// An assembled request, ready for a `Transport`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub context: Context,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
            context: Context::background(),
        }
    }

    /// Replace the cancellation/deadline signal.
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Set a header, replacing any existing value with the same
    /// (case-insensitive) name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A buffered response. Status codes are not interpreted here beyond the
/// opt-in `error_for_status`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::Deserialization)
    }

    /// Classify any non-2xx status into the typed error taxonomy: 401 and 404
    /// get their dedicated variants, everything else becomes `Error::Remote`.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let url = self.url.to_string();
        Err(match self.status {
            401 => Error::unauthorized(&url),
            404 => Error::not_found(&url),
            status => Error::Remote {
                host: self.url.host_str().unwrap_or_default().to_string(),
                status,
                url,
            },
        })
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
