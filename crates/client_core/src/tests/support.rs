//! In-process stand-in for the summarization backend used by the unit tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Notify};

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
struct Inner {
    responses: HashMap<String, (StatusCode, Value)>,
    hits: HashMap<String, usize>,
    bodies: HashMap<String, Vec<Value>>,
    uploads: Vec<RecordedUpload>,
    held: HashMap<String, Arc<Notify>>,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MockBackend {
    pub async fn spawn() -> Result<(String, MockBackend)> {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let backend = MockBackend::default();
        let app = Router::new()
            .route("/pdf/upload", post(handle_upload))
            .fallback(handle_json)
            .with_state(backend.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok((format!("http://{addr}"), backend))
    }

    pub fn respond(&self, path: &str, status: StatusCode, body: Value) {
        self.inner
            .lock()
            .expect("mock state")
            .responses
            .insert(path.to_string(), (status, body));
    }

    /// Parks requests to `path` until [`MockBackend::release`] is called.
    pub fn hold(&self, path: &str) {
        self.inner
            .lock()
            .expect("mock state")
            .held
            .insert(path.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, path: &str) {
        if let Some(gate) = self.inner.lock().expect("mock state").held.get(path) {
            gate.notify_one();
        }
    }

    pub fn hits(&self, path: &str) -> usize {
        self.inner
            .lock()
            .expect("mock state")
            .hits
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.inner.lock().expect("mock state").hits.values().sum()
    }

    pub fn last_body(&self, path: &str) -> Option<Value> {
        self.inner
            .lock()
            .expect("mock state")
            .bodies
            .get(path)
            .and_then(|bodies| bodies.last().cloned())
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.inner.lock().expect("mock state").uploads.clone()
    }

    fn record(&self, path: &str, body: Option<Value>) -> Option<Arc<Notify>> {
        let mut inner = self.inner.lock().expect("mock state");
        *inner.hits.entry(path.to_string()).or_default() += 1;
        if let Some(body) = body {
            inner.bodies.entry(path.to_string()).or_default().push(body);
        }
        inner.held.get(path).cloned()
    }

    fn response_for(&self, path: &str) -> (StatusCode, Value) {
        self.inner
            .lock()
            .expect("mock state")
            .responses
            .get(path)
            .cloned()
            .unwrap_or((StatusCode::NOT_FOUND, json!({"detail": "Not Found"})))
    }
}

async fn handle_json(
    State(backend): State<MockBackend>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> impl IntoResponse {
    let path = uri.path().to_string();
    let parsed = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<Value>(&body).ok()
    };
    tracing::debug!(%method, path = %path, "mock backend request");
    if let Some(gate) = backend.record(&path, parsed) {
        gate.notified().await;
    }
    let (status, payload) = backend.response_for(&path);
    (status, Json(payload))
}

async fn handle_upload(
    State(backend): State<MockBackend>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let path = "/pdf/upload";
    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        backend
            .inner
            .lock()
            .expect("mock state")
            .uploads
            .push(RecordedUpload {
                field_name,
                file_name,
                content_type,
                bytes,
            });
    }
    if let Some(gate) = backend.record(path, None) {
        gate.notified().await;
    }
    let (status, payload) = backend.response_for(path);
    (status, Json(payload))
}
