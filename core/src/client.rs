//! Client construction, request assembly and the verb methods.
//!
//! # Design
//! `Client` owns an immutable `Configuration` and a shared `Transport`. It is
//! cheap to clone and safe to use from many threads; the transport's
//! connection pool is the only shared resource and is created once.
//!
//! Every verb goes through `create_request`, then `execute_request` (see
//! `executor.rs`). The `*_request` variants stop after assembly so callers can
//! inspect or adjust a request before dispatching it themselves.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use url::Url;

use crate::config::{Configuration, JSON_MEDIA_TYPE};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse, Method};
use crate::transport::{Transport, UreqTransport};

/// Blocking JSON client bound to one base URL.
#[derive(Clone)]
pub struct Client {
    pub(crate) transport: Arc<dyn Transport>,
    config: Configuration,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Client {
    /// Default configuration for `base_url` and the default pooled transport.
    pub fn new(base_url: &str) -> Self {
        Self::from_parts(Configuration::with_base_url(base_url), Arc::new(UreqTransport::new()))
    }

    /// Caller-supplied configuration with the default pooled transport.
    ///
    /// # Panics
    /// If `config` is `None`. A missing configuration is a programming error.
    #[track_caller]
    pub fn with_config(config: impl Into<Option<Configuration>>) -> Self {
        let Some(config) = config.into() else {
            panic!("configuration is absent");
        };
        Self::from_parts(config, Arc::new(UreqTransport::new()))
    }

    /// Full override of the transport, e.g. a fake in tests or a differently
    /// tuned pool. The transport is shared by every clone of the client.
    ///
    /// # Panics
    /// If `config` or `transport` is `None`.
    #[track_caller]
    pub fn with_config_and_transport(
        config: impl Into<Option<Configuration>>,
        transport: Option<Arc<dyn Transport>>,
    ) -> Self {
        let Some(config) = config.into() else {
            panic!("configuration is absent");
        };
        let Some(transport) = transport else {
            panic!("transport is absent");
        };
        Self::from_parts(config, transport)
    }

    /// Caller-supplied configuration and transport.
    pub fn with_transport(config: Configuration, transport: impl Transport + 'static) -> Self {
        Self::from_parts(config, Arc::new(transport))
    }

    fn from_parts(config: Configuration, transport: Arc<dyn Transport>) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    // --- execute ---

    pub fn get_from(&self, path: &str) -> Result<HttpResponse> {
        self.get_from_with_context(&Context::background(), path)
    }

    pub fn post_to(&self, path: &str, body: impl Into<Vec<u8>>) -> Result<HttpResponse> {
        self.post_to_with_context(&Context::background(), path, body)
    }

    pub fn put_to(&self, path: &str, body: impl Into<Vec<u8>>) -> Result<HttpResponse> {
        self.put_to_with_context(&Context::background(), path, body)
    }

    pub fn delete_from(&self, path: &str) -> Result<HttpResponse> {
        self.delete_from_with_context(&Context::background(), path)
    }

    pub fn get_from_with_context(&self, ctx: &Context, path: &str) -> Result<HttpResponse> {
        let request = self.assemble(ctx, path, Method::Get, None)?;
        self.execute_request(request)
    }

    pub fn post_to_with_context(
        &self,
        ctx: &Context,
        path: &str,
        body: impl Into<Vec<u8>>,
    ) -> Result<HttpResponse> {
        let request = self.assemble(ctx, path, Method::Post, Some(body.into()))?;
        self.execute_request(request)
    }

    pub fn put_to_with_context(
        &self,
        ctx: &Context,
        path: &str,
        body: impl Into<Vec<u8>>,
    ) -> Result<HttpResponse> {
        let request = self.assemble(ctx, path, Method::Put, Some(body.into()))?;
        self.execute_request(request)
    }

    pub fn delete_from_with_context(&self, ctx: &Context, path: &str) -> Result<HttpResponse> {
        let request = self.assemble(ctx, path, Method::Delete, None)?;
        self.execute_request(request)
    }

    /// POST `value` serialized as JSON.
    pub fn post_json<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<HttpResponse> {
        let body = serde_json::to_vec(value).map_err(Error::Serialization)?;
        self.post_to(path, body)
    }

    /// PUT `value` serialized as JSON.
    pub fn put_json<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<HttpResponse> {
        let body = serde_json::to_vec(value).map_err(Error::Serialization)?;
        self.put_to(path, body)
    }

    // --- assemble only ---

    pub fn get_request(&self, path: &str) -> Result<HttpRequest> {
        self.assemble(&Context::background(), path, Method::Get, None)
    }

    pub fn post_request(&self, path: &str, body: impl Into<Vec<u8>>) -> Result<HttpRequest> {
        self.assemble(&Context::background(), path, Method::Post, Some(body.into()))
    }

    pub fn put_request(&self, path: &str, body: impl Into<Vec<u8>>) -> Result<HttpRequest> {
        self.assemble(&Context::background(), path, Method::Put, Some(body.into()))
    }

    pub fn delete_request(&self, path: &str) -> Result<HttpRequest> {
        self.assemble(&Context::background(), path, Method::Delete, None)
    }

    fn assemble(
        &self,
        ctx: &Context,
        path: &str,
        method: Method,
        body: Option<Vec<u8>>,
    ) -> Result<HttpRequest> {
        create_request(
            ctx,
            self.config.base_url(),
            path,
            method,
            body,
            self.config.username(),
            self.config.password(),
        )
    }
}

/// Join `base_url` and `path` with exactly one slash, attach the JSON headers
/// and, when both credentials are non-empty, basic auth.
///
/// `Content-Type` and `Accept` are always `application/json`, whatever accept
/// value the configuration carries.
pub fn create_request(
    ctx: &Context,
    base_url: &str,
    path: &str,
    method: Method,
    body: Option<Vec<u8>>,
    username: &str,
    password: &str,
) -> Result<HttpRequest> {
    let url = Url::parse(&join_url(base_url, path))
        .map_err(|e| Error::InvalidRequest(format!("invalid URL {base_url:?} + {path:?}: {e}")))?;

    let mut request = HttpRequest::new(method, url).with_context(ctx.clone());
    request.body = body;
    request.set_header("Content-Type", JSON_MEDIA_TYPE);
    request.set_header("Accept", JSON_MEDIA_TYPE);

    if !username.is_empty() && !password.is_empty() {
        request.set_header("Authorization", basic_auth(username, password));
    }

    Ok(request)
}

fn join_url(base_url: &str, path: &str) -> String {
    let base_url = base_url.strip_suffix('/').unwrap_or(base_url);
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{base_url}/{path}")
}

fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use proptest::prelude::*;

    use super::*;

    const BASE_URL: &str = "https://github.com/camunda";

    /// Records every request and answers with a fixed status and body.
    struct RecordingTransport {
        status: u16,
        body: Vec<u8>,
        sent: Arc<Mutex<Vec<(HttpRequest, Duration)>>>,
    }

    impl RecordingTransport {
        fn new(status: u16, body: &str) -> (Self, Arc<Mutex<Vec<(HttpRequest, Duration)>>>) {
            let sent = Arc::new(Mutex::new(Vec::new()));
            let transport = Self {
                status,
                body: body.as_bytes().to_vec(),
                sent: sent.clone(),
            };
            (transport, sent)
        }
    }

    impl Transport for RecordingTransport {
        fn send(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse> {
            self.sent.lock().unwrap().push((request.clone(), timeout));
            Ok(HttpResponse {
                status: self.status,
                url: request.url.clone(),
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    fn client() -> Client {
        Client::new(BASE_URL)
    }

    #[test]
    fn new_client_uses_default_configuration() {
        let client = client();
        assert_eq!(client.config(), &Configuration::with_base_url(BASE_URL));
    }

    #[test]
    fn with_config_keeps_caller_configuration() {
        let config = Configuration::new(BASE_URL, "user", "pass", "text/plain");
        let client = Client::with_config(config.clone());
        assert_eq!(client.config(), &config);
    }

    #[test]
    #[should_panic(expected = "configuration is absent")]
    fn with_config_panics_without_configuration() {
        let _ = Client::with_config(None);
    }

    #[test]
    #[should_panic(expected = "configuration is absent")]
    fn with_config_and_transport_panics_without_configuration() {
        let (transport, _) = RecordingTransport::new(200, "");
        let _ = Client::with_config_and_transport(None, Some(Arc::new(transport)));
    }

    #[test]
    #[should_panic(expected = "transport is absent")]
    fn with_config_and_transport_panics_without_transport() {
        let _ = Client::with_config_and_transport(Configuration::with_base_url(BASE_URL), None);
    }

    #[test]
    fn with_config_and_transport_uses_supplied_transport() {
        let (transport, sent) = RecordingTransport::new(200, "");
        let client = Client::with_config_and_transport(
            Configuration::with_base_url(BASE_URL),
            Some(Arc::new(transport)),
        );
        client.get_from("items").unwrap();
        assert_eq!(sent.lock().unwrap().len(), 1);

        let shared: Arc<dyn Transport> = Arc::new(UreqTransport::new());
        let client = Client::with_config_and_transport(Configuration::with_base_url(BASE_URL), Some(shared));
        assert_eq!(client.config().base_url(), BASE_URL);
    }

    #[test]
    fn get_request_joins_url_and_sets_json_headers() {
        let req = client().get_request("/issues").unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.url.as_str(), "https://github.com/camunda/issues");
        assert_eq!(req.header("Content-Type"), Some(JSON_MEDIA_TYPE));
        assert_eq!(req.header("Accept"), Some(JSON_MEDIA_TYPE));
        assert!(req.header("Authorization").is_none());
        assert!(req.body.is_none());
        assert!(req.context.deadline().is_none());
    }

    #[test]
    fn post_and_put_requests_carry_body() {
        let req = client().post_request("items", r#"{"id":1}"#).unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.body.as_deref(), Some(br#"{"id":1}"#.as_slice()));

        let req = client().put_request("items/1", r#"{"id":1}"#).unwrap();
        assert_eq!(req.method, Method::Put);
        assert_eq!(req.url.as_str(), "https://github.com/camunda/items/1");
    }

    #[test]
    fn delete_request_has_no_body() {
        let req = client().delete_request("items/1").unwrap();
        assert_eq!(req.method, Method::Delete);
        assert!(req.body.is_none());
    }

    #[test]
    fn configured_accept_does_not_change_headers() {
        let config = Configuration::new(BASE_URL, "", "", "text/plain");
        let req = Client::with_config(config).get_request("x").unwrap();
        assert_eq!(req.header("Accept"), Some(JSON_MEDIA_TYPE));
    }

    #[test]
    fn credentials_add_basic_auth() {
        let config = Configuration::new(BASE_URL, "user", "pass", "");
        let req = Client::with_config(config).get_request("x").unwrap();
        assert_eq!(req.header("Authorization"), Some("Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn malformed_base_url_is_invalid_request() {
        let err = Client::new("not a url").get_request("x").unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn trims_exactly_one_slash_each_side() {
        assert_eq!(join_url("https://h/api/", "/items"), "https://h/api/items");
        assert_eq!(join_url("https://h/api", "items"), "https://h/api/items");
        assert_eq!(join_url("https://h/api//", "items"), "https://h/api//items");
        assert_eq!(join_url("https://h/api", "//items"), "https://h/api//items");
    }

    #[test]
    fn context_variant_keeps_caller_deadline() {
        let (transport, sent) = RecordingTransport::new(200, "");
        let client = Client::with_transport(Configuration::with_base_url(BASE_URL), transport);
        let ctx = Context::background().with_timeout(Duration::from_secs(5));
        client.get_from_with_context(&ctx, "items").unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].0.context.deadline(), ctx.deadline());
        assert!(sent[0].1 <= Duration::from_secs(5));
    }

    #[test]
    fn post_json_serializes_body() {
        let (transport, sent) = RecordingTransport::new(201, "");
        let client = Client::with_transport(Configuration::with_base_url(BASE_URL), transport);
        client.post_json("items", &serde_json::json!({"id": 1})).unwrap();

        let sent = sent.lock().unwrap();
        let body: serde_json::Value = serde_json::from_slice(sent[0].0.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["id"], 1);
        assert_eq!(sent[0].0.method, Method::Post);
    }

    #[test]
    fn client_is_shareable_across_threads() {
        let (transport, sent) = RecordingTransport::new(200, "{}");
        let client = Client::with_transport(Configuration::with_base_url(BASE_URL), transport);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let client = client.clone();
                std::thread::spawn(move || client.get_from(&format!("items/{i}")).unwrap().status)
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 200);
        }
        assert_eq!(sent.lock().unwrap().len(), 4);
    }

    proptest! {
        #[test]
        fn assembled_url_has_one_separating_slash(
            segment in "[a-z]{1,8}",
            path in "[a-z]{1,8}(/[a-z]{1,8}){0,2}",
            trailing in any::<bool>(),
            leading in any::<bool>(),
        ) {
            let base = format!("https://h/{segment}{}", if trailing { "/" } else { "" });
            let rel = format!("{}{path}", if leading { "/" } else { "" });
            let req = Client::new(&base).get_request(&rel).unwrap();
            prop_assert_eq!(req.url.as_str(), format!("https://h/{segment}/{path}"));
        }

        #[test]
        fn authorization_present_only_with_both_credentials(
            username in "[a-z]{0,6}",
            password in "[a-z0-9]{0,6}",
        ) {
            let config = Configuration::new(BASE_URL, username.clone(), password.clone(), "");
            let req = Client::with_config(config).get_request("x").unwrap();
            if username.is_empty() || password.is_empty() {
                prop_assert!(req.header("Authorization").is_none());
            } else {
                let expected = format!("Basic {}", STANDARD.encode(format!("{username}:{password}")));
                prop_assert_eq!(req.header("Authorization"), Some(expected.as_str()));
            }
        }
    }
}
