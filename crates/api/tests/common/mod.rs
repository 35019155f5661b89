#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;
use tower::ServiceExt;

use content_engine_api::automation::{AutomationClient, WEBHOOK_SECRET_HEADER};
use content_engine_api::blob::{BlobError, BlobStore, LocalBlobStore, StoredBlob};
use content_engine_api::config::{AutomationConfig, BlobConfig, Environment, ServerConfig};
use content_engine_api::router::build_app_router;
use content_engine_api::state::AppState;
use content_engine_db::DbPool;

pub const APP_URL: &str = "http://localhost:3000";
pub const BLOB_BASE_URL: &str = "http://localhost:3000/blobs";
pub const SECRET: &str = "test-callback-secret";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(blob_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![APP_URL.to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        max_upload_bytes: 10 * 1024 * 1024,
        environment: Environment::Production,
        automation: AutomationConfig {
            webhook_base_url: None,
            callback_secret: Some(SECRET.to_string()),
            app_url: APP_URL.to_string(),
        },
        blob: BlobConfig {
            root_dir: blob_dir,
            public_base_url: BLOB_BASE_URL.to_string(),
        },
    }
}

/// An in-memory project store with migrations applied.
pub async fn test_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    content_engine_db::run_migrations(&pool)
        .await
        .expect("migrations");
    pool
}

// ---------------------------------------------------------------------------
// Mock automation service
// ---------------------------------------------------------------------------

/// One request received by the mock automation service.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub secret: Option<String>,
    pub body: Value,
}

/// Transcript the mock reports back for an analysed reference video.
pub const INGEST_TRANSCRIPT: &str = "Three things nobody tells you";

#[derive(Clone)]
struct MockState {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    reply: Arc<(StatusCode, String)>,
    /// When set, `/ingest` posts an ingest-complete callback to this router
    /// before replying, the way a fast workflow would.
    app: Option<Arc<OnceLock<Router>>>,
    callback_statuses: Arc<Mutex<Vec<StatusCode>>>,
}

/// An in-process stand-in for n8n that records every webhook call.
pub struct MockAutomation {
    pub base_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    callback_statuses: Arc<Mutex<Vec<StatusCode>>>,
}

impl MockAutomation {
    /// Start a mock answering every call with `status` and `body`.
    pub async fn start(status: StatusCode, body: &str) -> Self {
        Self::start_with(status, body, None).await
    }

    async fn start_with(
        status: StatusCode,
        body: &str,
        app: Option<Arc<OnceLock<Router>>>,
    ) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let callback_statuses = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            calls: Arc::clone(&calls),
            reply: Arc::new((status, body.to_string())),
            app,
            callback_statuses: Arc::clone(&callback_statuses),
        };
        let app = Router::new()
            .route("/{*path}", any(record))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock");
        let addr = listener.local_addr().expect("mock addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        Self {
            base_url: format!("http://{addr}/webhook"),
            calls,
            callback_statuses,
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Statuses the app returned to callbacks sent by the mock itself.
    pub fn callback_statuses(&self) -> Vec<StatusCode> {
        self.callback_statuses.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let path = uri
        .path()
        .strip_prefix("/webhook")
        .unwrap_or(uri.path())
        .to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.calls.lock().unwrap().push(RecordedCall {
        path: path.clone(),
        secret: headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.clone(),
    });

    if let Some(app) = state.app.as_ref().and_then(|app| app.get()) {
        if path == "/ingest" {
            let callback = json!({
                "projectId": body["projectId"],
                "stage": "ingest-complete",
                "result": { "transcript": INGEST_TRANSCRIPT },
            });
            let response = post_callback(app, &callback).await;
            state.callback_statuses.lock().unwrap().push(response.status());
        }
    }

    let (status, body) = state.reply.as_ref();
    (*status, body.clone())
}

// ---------------------------------------------------------------------------
// Blob stores
// ---------------------------------------------------------------------------

/// A blob store whose every write fails.
pub struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn put(
        &self,
        _pathname: &str,
        _bytes: &[u8],
        _content_type: &str,
    ) -> Result<StoredBlob, BlobError> {
        Err(BlobError::Io(std::io::Error::other("storage unavailable")))
    }
}

// ---------------------------------------------------------------------------
// Test application
// ---------------------------------------------------------------------------

/// The full router plus handles on everything it talks to.
pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    pub mock: Option<MockAutomation>,
    pub blob_dir: TempDir,
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    /// Production environment, secret configured, no automation service.
    pub async fn new() -> Self {
        Self::builder().build().await
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.mock.as_ref().map(MockAutomation::calls).unwrap_or_default()
    }

    pub fn callback_statuses(&self) -> Vec<StatusCode> {
        self.mock
            .as_ref()
            .map(MockAutomation::callback_statuses)
            .unwrap_or_default()
    }
}

pub struct TestAppBuilder {
    secret: Option<String>,
    environment: Environment,
    mock_reply: Option<(StatusCode, String)>,
    ingest_reports_back: bool,
    failing_blobs: bool,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            secret: Some(SECRET.to_string()),
            environment: Environment::Production,
            mock_reply: None,
            ingest_reports_back: false,
            failing_blobs: false,
        }
    }
}

impl TestAppBuilder {
    pub fn without_secret(mut self) -> Self {
        self.secret = None;
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Point the app at a mock automation service answering with `status`/`body`.
    pub fn automation(mut self, status: StatusCode, body: &str) -> Self {
        self.mock_reply = Some((status, body.to_string()));
        self
    }

    /// Make the mock's `/ingest` call back with ingest-complete before it
    /// answers the notification.
    pub fn ingest_reports_back(mut self) -> Self {
        self.ingest_reports_back = true;
        self
    }

    pub fn failing_blobs(mut self) -> Self {
        self.failing_blobs = true;
        self
    }

    pub async fn build(self) -> TestApp {
        let blob_dir = tempfile::tempdir().expect("blob dir");
        let pool = test_pool().await;

        let app_slot = self.ingest_reports_back.then(|| Arc::new(OnceLock::new()));
        let mock = match self.mock_reply {
            Some((status, body)) => {
                Some(MockAutomation::start_with(status, &body, app_slot.clone()).await)
            }
            None => None,
        };

        let mut config = test_config(blob_dir.path().to_path_buf());
        config.environment = self.environment;
        config.automation.callback_secret = self.secret;
        config.automation.webhook_base_url = mock.as_ref().map(|m| m.base_url.clone());

        let blobs: Arc<dyn BlobStore> = if self.failing_blobs {
            Arc::new(FailingBlobStore)
        } else {
            Arc::new(LocalBlobStore::new(&config.blob))
        };

        let state = AppState {
            pool: pool.clone(),
            config: Arc::new(config.clone()),
            automation: AutomationClient::new(&config.automation),
            blobs,
        };

        let router = build_app_router(state, &config);
        if let Some(slot) = app_slot {
            let _ = slot.set(router.clone());
        }

        TestApp {
            router,
            pool,
            mock,
            blob_dir,
        }
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// Send a JSON body with optional extra headers.
pub async fn json_request(
    app: &Router,
    method: Method,
    uri: &str,
    body: &Value,
    headers: &[(&str, &str)],
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> Response {
    json_request(app, Method::POST, uri, body, &[]).await
}

/// POST a callback carrying the test secret.
pub async fn post_callback(app: &Router, body: &Value) -> Response {
    json_request(
        app,
        Method::POST,
        "/api/n8n/callback",
        body,
        &[(WEBHOOK_SECRET_HEADER, SECRET)],
    )
    .await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "content-engine-test-boundary";

/// One part of a `multipart/form-data` body.
pub enum FormPart<'a> {
    Text {
        name: &'a str,
        value: &'a str,
    },
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

pub fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            FormPart::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            FormPart::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: &Router, uri: &str, parts: &[FormPart<'_>]) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}
