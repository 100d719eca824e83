// Stub backend for integration tests: records every request and answers
// with whatever the test's responder returns.
#![allow(dead_code)]

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Captured {
    pub fn header_values(&self, name: &str) -> Vec<String> {
        self.headers
            .get_all(name)
            .iter()
            .map(|value| value.to_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.header_values(name).into_iter().next()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl StubResponse {
    pub fn json(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn bytes(content_type: &'static str, body: &[u8]) -> Self {
        Self {
            status: StatusCode::OK,
            content_type,
            body: body.to_vec(),
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: Vec::new(),
        }
    }
}

type Responder = Arc<dyn Fn(&Captured) -> StubResponse + Send + Sync>;

#[derive(Clone)]
struct StubState {
    captured: Arc<Mutex<Vec<Captured>>>,
    responder: Responder,
}

pub struct StubServer {
    pub base_url: String,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl StubServer {
    // Start a stub on an ephemeral port; its base URL carries the `/api` prefix.
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&Captured) -> StubResponse + Send + Sync + 'static,
    {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            captured: Arc::clone(&captured),
            responder: Arc::new(responder),
        };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral test port");
        let addr = listener.local_addr().expect("get local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server failed");
        });

        Self {
            base_url: format!("http://{addr}/api"),
            captured,
        }
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().expect("captured lock").clone()
    }

    pub fn only_request(&self) -> Captured {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().expect("one request")
    }
}

async fn handle(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let captured = Captured {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    };
    let reply = (state.responder)(&captured);
    state.captured.lock().expect("captured lock").push(captured);

    (
        reply.status,
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body,
    )
        .into_response()
}

// Direct connections only; a proxy from the environment would swallow
// loopback requests.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build test http client")
}

// An address nothing is listening on.
pub async fn closed_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    drop(listener);
    format!("http://{addr}/api")
}
