use std::{collections::BTreeMap, time::Duration};

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{any, get},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use tokio::net::TcpListener;

pub const USERNAME: &str = "user";
pub const PASSWORD: &str = "pass";

/// Body served by `GET /fixture`.
pub const FIXTURE_BODY: &str = r#"{"id":1}"#;

#[derive(Deserialize)]
pub struct RedirectParams {
    pub to: String,
}

#[derive(Deserialize)]
pub struct LargeParams {
    pub bytes: usize,
}

#[derive(Deserialize)]
pub struct SlowParams {
    #[serde(default)]
    pub ms: u64,
}

pub fn app() -> Router {
    Router::new()
        .route("/fixture", get(fixture))
        .route("/echo", any(echo))
        .route("/headers", any(echo_headers))
        .route("/query", get(echo_query))
        .route("/secure", any(secure))
        .route("/status/{code}", any(status))
        .route("/slow", get(slow))
        .route("/large", get(large))
        .route("/redirect", any(redirect))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn fixture() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], FIXTURE_BODY)
}

/// Returns the request body unchanged.
async fn echo(body: Bytes) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], body)
}

/// Request headers as a JSON object, names lower-cased.
async fn echo_headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    Json(
        headers
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect(),
    )
}

async fn echo_query(Query(params): Query<BTreeMap<String, String>>) -> Json<BTreeMap<String, String>> {
    Json(params)
}

async fn secure(headers: HeaderMap) -> StatusCode {
    let expected = format!("Basic {}", STANDARD.encode(format!("{USERNAME}:{PASSWORD}")));
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => StatusCode::OK,
        _ => {
            tracing::debug!("rejecting request without valid credentials");
            StatusCode::UNAUTHORIZED
        }
    }
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

/// `bytes` bytes of `a`, for bodies larger than a client's default cap.
async fn large(Query(params): Query<LargeParams>) -> Vec<u8> {
    vec![b'a'; params.bytes]
}

async fn redirect(Query(params): Query<RedirectParams>) -> Redirect {
    Redirect::temporary(&params.to)
}

async fn slow(Query(params): Query<SlowParams>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(params.ms)).await;
    "done"
}
