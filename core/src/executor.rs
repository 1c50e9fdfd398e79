//! Request dispatch and status classification.
//!
//! # Design
//! Only 401 and 404 become typed errors here; every other status, including
//! other 4xx and 5xx, is handed back as a response for the caller to inspect.
//! Transport failures are logged and returned, never fatal.

use std::time::Duration;

use tracing::{debug, error, field, instrument, Span};

use crate::client::Client;
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};

/// Deadline applied when a request's context carries none.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

impl Client {
    /// Send `request` through this client's transport.
    ///
    /// A request without a deadline gets `DEFAULT_REQUEST_TIMEOUT` from now.
    #[instrument(
        name = "http_request",
        skip_all,
        fields(
            http.method = %request.method,
            http.url = %request.url,
            http.status_code = field::Empty,
        )
    )]
    pub fn execute_request(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        if request.context.deadline().is_none() {
            request.context = request.context.with_timeout(DEFAULT_REQUEST_TIMEOUT);
        }

        let url = request.url.to_string();
        if request.context.is_cancelled() {
            debug!("cancelled before dispatch");
            return Err(Error::Cancelled { url });
        }
        let remaining = request.context.remaining().unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        if remaining.is_zero() {
            debug!("deadline passed before dispatch");
            return Err(Error::Timeout { url });
        }

        let response = self.transport.send(&request, remaining).map_err(|err| {
            error!(error = %err, "request failed");
            err
        })?;

        Span::current().record("http.status_code", response.status);
        classify(response)
    }
}

/// 401 and 404 become errors carrying the URL that answered, which differs
/// from the request URL after a redirect.
fn classify(response: HttpResponse) -> Result<HttpResponse> {
    match response.status {
        401 => {
            debug!(url = %response.url, "authentication required");
            Err(Error::unauthorized(response.url.as_str()))
        }
        404 => {
            debug!(url = %response.url, "resource not found");
            Err(Error::not_found(response.url.as_str()))
        }
        _ => Ok(response),
    }
}
