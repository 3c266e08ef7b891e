//! In-process stand-in for the authorization service.
//!
//! Every request is recorded, then the bearer token is checked the way the
//! real service's JWT middleware does before the configured reply is sent.

use std::sync::Arc;
use std::time::Duration;

use authz_credentials::{CredentialVerifier, Identity};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;

pub const CLIENT_ID: &str = "svc-integration";
pub const CLIENT_SECRET: &str = "integration-secret";

pub fn identity() -> Identity {
    Identity::new(CLIENT_ID, CLIENT_SECRET)
}

/// What the stand-in answers with.
#[derive(Clone, Debug)]
pub enum Reply {
    /// 200 with a JSON body
    Json(Value),
    /// 200 with a plain text body
    Text(&'static str),
    /// The given status with a plain text body
    Status(u16, &'static str),
    /// Wait before answering 200 with a JSON body
    Stall(Duration, Value),
}

/// A request as the service saw it.
#[derive(Clone, Debug)]
pub struct Received {
    pub method: Method,
    pub path: String,
    pub token: Option<String>,
    pub correlation_id: Option<String>,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone)]
struct ServerState {
    reply: Reply,
    verifier: CredentialVerifier,
    received: Arc<Mutex<Vec<Received>>>,
}

pub struct TestServer {
    pub url: String,
    received: Arc<Mutex<Vec<Received>>>,
}

impl TestServer {
    /// All requests received so far.
    pub fn received(&self) -> Vec<Received> {
        self.received.lock().clone()
    }
}

async fn handle(
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let correlation_id = headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.received.lock().push(Received {
        method,
        path: uri.path().to_string(),
        token: token.clone(),
        correlation_id,
        headers,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let authorized = token
        .as_deref()
        .is_some_and(|token| state.verifier.verify(token).is_ok());
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "Invalid token").into_response();
    }

    match state.reply {
        Reply::Json(value) => (StatusCode::OK, Json(value)).into_response(),
        Reply::Text(text) => (StatusCode::OK, text).into_response(),
        Reply::Status(status, text) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            text,
        )
            .into_response(),
        Reply::Stall(delay, value) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, Json(value)).into_response()
        }
    }
}

/// Create and start a test server, return its handle
pub async fn start_test_server(reply: Reply) -> TestServer {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        reply,
        verifier: CredentialVerifier::new(identity()),
        received: received.clone(),
    };

    let app = Router::new().fallback(handle).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        url: format!("http://{}", addr),
        received,
    }
}

/// An address nothing is listening on.
pub async fn unused_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    format!("http://{}", addr)
}
