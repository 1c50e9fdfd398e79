//! Fluent request builder.
//!
//! Accumulates method, target URL, query parameters and body, then produces
//! an `HttpRequest` on `build()`. Independent of `Client`: the path must be
//! an absolute URL, and the result can be sent with
//! `Client::execute_request`.
//!
//! `as_json()` only records the accept value; `build()` adds no headers.

use std::collections::BTreeMap;

use url::Url;

use crate::config::JSON_MEDIA_TYPE;
use crate::error::{Error, Result};
use crate::http::{HttpRequest, Method};

#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    path: String,
    query_params: BTreeMap<String, String>,
    body: Option<Vec<u8>>,
    accept: Option<String>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self) -> &mut Self {
        self.method = Some(Method::Get);
        self
    }

    pub fn post(&mut self) -> &mut Self {
        self.method = Some(Method::Post);
        self
    }

    pub fn put(&mut self) -> &mut Self {
        self.method = Some(Method::Put);
        self
    }

    pub fn delete(&mut self) -> &mut Self {
        self.method = Some(Method::Delete);
        self
    }

    pub fn path(&mut self, path: impl Into<String>) -> &mut Self {
        self.path = path.into();
        self
    }

    /// Set one query parameter; a repeated key overwrites the earlier value.
    pub fn query_param(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    pub fn with_content(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    pub fn as_json(&mut self) -> &mut Self {
        self.accept = Some(JSON_MEDIA_TYPE.to_string());
        self
    }

    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    /// Produce the request. Query parameters are merged with any query
    /// already present in the path and encoded sorted by key.
    pub fn build(&self) -> Result<HttpRequest> {
        let method = self
            .method
            .ok_or_else(|| Error::InvalidRequest("method not set".to_string()))?;
        let mut url = Url::parse(&self.path)
            .map_err(|e| Error::InvalidRequest(format!("invalid URL {:?}: {e}", self.path)))?;

        if !self.query_params.is_empty() {
            let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            pairs.extend(self.query_params.iter().map(|(k, v)| (k.clone(), v.clone())));
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }

        let mut request = HttpRequest::new(method, url);
        request.body = self.body.clone();
        Ok(request)
    }
}
