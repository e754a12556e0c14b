#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use atelier_api::ai::client::AiContentClient;
use atelier_api::auth::jwt::{generate_session_token, JwtConfig};
use atelier_api::cache::QueryCache;
use atelier_api::config::ServerConfig;
use atelier_api::router::build_app_router;
use atelier_api::state::AppState;
use atelier_core::pricing::MaterialRates;
use atelier_core::types::DbId;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_ID: DbId = 1;
pub const CUSTOMER_ID: DbId = 100;
pub const OTHER_CUSTOMER_ID: DbId = 200;

/// AI endpoint used when a test does not exercise content generation.
const UNUSED_AI_URL: &str = "http://127.0.0.1:9/generate-content";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(upload_dir: &TempDir, ai_content_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            session_expiry_hours: 1,
        },
        ai_content_url: ai_content_url.to_string(),
        ai_request_timeout_secs: 5,
        upload_dir: upload_dir.path().to_path_buf(),
        public_upload_base: "/uploads".to_string(),
        cache_ttl_secs: 60,
        price_refresh_interval_secs: 1800,
        inr_per_usd: 83.0,
    }
}

/// A router wired exactly like production, plus the state behind it.
///
/// Holds the temporary upload directory so it lives as long as the test.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub fn admin_token(&self) -> String {
        token_for(&self.state, ADMIN_ID, "admin")
    }

    pub fn customer_token(&self) -> String {
        token_for(&self.state, CUSTOMER_ID, "customer")
    }

    pub fn other_customer_token(&self) -> String {
        token_for(&self.state, OTHER_CUSTOMER_ID, "customer")
    }
}

fn token_for(state: &AppState, user_id: DbId, role: &str) -> String {
    generate_session_token(user_id, role, &state.config.jwt).expect("token generation")
}

/// Build the full application with the given pool.
pub async fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with_ai(pool, UNUSED_AI_URL).await
}

/// Build the full application with the AI client pointed at `ai_content_url`.
pub async fn build_test_app_with_ai(pool: PgPool, ai_content_url: &str) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("temp upload dir");
    let config = test_config(&upload_dir, ai_content_url);

    let ai_client = AiContentClient::new(
        config.ai_content_url.clone(),
        Duration::from_secs(config.ai_request_timeout_secs),
    )
    .expect("AI client");

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cache: Arc::new(QueryCache::new(Duration::from_secs(config.cache_ttl_secs))),
        ai_client,
        rates: Arc::new(MaterialRates::default()),
    };

    let router = build_app_router(state.clone(), &config);
    TestApp {
        router,
        state,
        upload_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should complete")
}

fn with_auth(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub async fn get(app: Router, uri: &str) -> Response {
    get_auth(app, uri, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: Option<&str>) -> Response {
    let request = with_auth(Request::builder().method("GET").uri(uri), token)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, "POST", uri, body, None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send_json(app, "POST", uri, body, Some(token)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send_json(app, "PUT", uri, body, Some(token)).await
}

async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Response {
    let request = with_auth(Request::builder().method(method).uri(uri), token)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn put_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = with_auth(Request::builder().method("PUT").uri(uri), Some(token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = with_auth(Request::builder().method("DELETE").uri(uri), Some(token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// One multipart field: name, optional file name, content.
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            filename: None,
            data: value.as_bytes(),
        }
    }

    pub fn file(name: &'a str, filename: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            filename: Some(filename),
            data,
        }
    }
}

const BOUNDARY: &str = "atelier-test-boundary";

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    parts: &[Part<'_>],
    token: &str,
) -> Response {
    let request = with_auth(Request::builder().method("POST").uri(uri), Some(token))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a status and return the parsed body.
pub async fn expect_status(response: Response, status: StatusCode) -> serde_json::Value {
    let actual = response.status();
    let json = body_json(response).await;
    assert_eq!(actual, status, "unexpected status; body: {json}");
    json
}

// ---------------------------------------------------------------------------
// Fake AI content service
// ---------------------------------------------------------------------------

/// A stand-in for the AI content endpoint.
///
/// Replies with a fixed status and JSON body, and records the content type
/// of every request it receives.
pub struct FakeAi {
    pub url: String,
    pub content_types: Arc<Mutex<Vec<String>>>,
}

pub async fn spawn_fake_ai(status: StatusCode, reply: serde_json::Value) -> FakeAi {
    let content_types = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&content_types);

    let app = Router::new().route(
        "/generate-content",
        axum::routing::post(move |request: Request<Body>| {
            let recorded = Arc::clone(&recorded);
            let reply = reply.clone();
            async move {
                let content_type = request
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                recorded.lock().unwrap().push(content_type);
                (status, axum::Json(reply))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeAi {
        url: format!("http://{addr}/generate-content"),
        content_types,
    }
}

/// A complete generator response.
pub fn complete_ai_reply() -> serde_json::Value {
    serde_json::json!({
        "title": "Aurora Halo Ring",
        "tagline": "Light, caught.",
        "shortDescription": "An 18k gold halo ring.",
        "detailedDescription": "Hand-set pavé around a brilliant centre stone.",
        "priceUSD": 1299.0,
        "priceINR": 107817.0
    })
}
