//! The transport seam and the default pooled transport.
//!
//! # Design
//! `Client` never talks to the network directly; it hands an `HttpRequest`
//! to a `Transport` and gets back a buffered `HttpResponse`. The default
//! implementation wraps a single `ureq::Agent`, built once so its connection
//! pool is shared by every call the client makes. Tests inject their own
//! implementation instead.
//!
//! Status codes are data at this layer: the agent is configured with
//! `http_status_as_error(false)` so 4xx/5xx come back as responses and the
//! executor decides what they mean. Redirects are followed, and the response
//! carries the URL it was finally served from. Bodies are read in full with no
//! size cap.

use std::time::Duration;

use tracing::debug;
use ureq::ResponseExt;
use url::Url;

use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse, Method};

/// Sends one assembled request and buffers the response.
///
/// `timeout` is the time left until the request's deadline; implementations
/// must not block past it.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse>;
}

/// Pool and timeout tuning for `UreqTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    /// Upper bound for a whole call.
    pub timeout: Duration,
    pub dial_timeout: Duration,
    pub keep_alive: Duration,
    pub max_idle_connections: usize,
    pub idle_connection_timeout: Duration,
    pub tls_handshake_timeout: Duration,
    pub expect_continue_timeout: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            dial_timeout: Duration::from_secs(30),
            keep_alive: Duration::from_secs(30),
            max_idle_connections: 100,
            idle_connection_timeout: Duration::from_secs(90),
            tls_handshake_timeout: Duration::from_secs(10),
            expect_continue_timeout: Duration::from_secs(1),
        }
    }
}

/// Blocking pooled transport backed by `ureq`.
///
/// ureq exposes no separate TLS handshake or TCP keep-alive timer; the
/// handshake is bounded by the overall timeout, and pooled connections are
/// retired after `idle_connection_timeout`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    settings: TransportSettings,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").field("settings", &self.settings).finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_settings(TransportSettings::default())
    }

    pub fn with_settings(settings: TransportSettings) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(settings.timeout))
            .timeout_connect(Some(settings.dial_timeout))
            .timeout_await_100(Some(settings.expect_continue_timeout))
            .max_idle_connections(settings.max_idle_connections)
            .max_idle_age(settings.idle_connection_timeout)
            .build()
            .new_agent();
        Self { agent, settings }
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse> {
        let url = request.url.as_str();
        let timeout = timeout.min(self.settings.timeout);
        let headers = &request.headers;
        let body = request.body.as_deref();

        let result = match (request.method, body) {
            (Method::Get, None) => prepare(self.agent.get(url), headers, timeout).call(),
            (Method::Get, Some(body)) => {
                prepare(self.agent.get(url).force_send_body(), headers, timeout).send(body)
            }
            (Method::Delete, None) => prepare(self.agent.delete(url), headers, timeout).call(),
            (Method::Delete, Some(body)) => {
                prepare(self.agent.delete(url).force_send_body(), headers, timeout).send(body)
            }
            (Method::Post, Some(body)) => prepare(self.agent.post(url), headers, timeout).send(body),
            (Method::Post, None) => prepare(self.agent.post(url), headers, timeout).send_empty(),
            (Method::Put, Some(body)) => prepare(self.agent.put(url), headers, timeout).send(body),
            (Method::Put, None) => prepare(self.agent.put(url), headers, timeout).send_empty(),
        };

        let mut response = result.map_err(|e| map_ureq_error(url, e))?;

        let status = response.status().as_u16();
        let final_url = Url::parse(&response.get_uri().to_string()).unwrap_or_else(|_| request.url.clone());
        let response_headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| map_ureq_error(url, e))?;

        debug!(status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            url: final_url,
            headers: response_headers,
            body,
        })
    }
}

fn prepare<B>(
    builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
    timeout: Duration,
) -> ureq::RequestBuilder<B> {
    let mut builder = builder.config().timeout_global(Some(timeout)).build();
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn map_ureq_error(url: &str, error: ureq::Error) -> Error {
    match error {
        ureq::Error::Timeout(_) => Error::Timeout {
            url: url.to_string(),
        },
        other => Error::Transport {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}
