//! Shared helpers: a programmable stub resume agent and gateway builders.

#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use resume_gateway::{AppState, GatewayConfig, app, build_router};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ORIGIN: &str = "http://localhost:5173";

struct StubState {
    status: StatusCode,
    body: &'static str,
    calls: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
}

pub struct StubUpstream {
    pub url: String,
    calls: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
}

impl StubUpstream {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }
}

async fn query_resume(State(stub): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    stub.calls.fetch_add(1, Ordering::SeqCst);
    *stub.last_body.lock().unwrap() = Some(body);
    (
        stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        stub.body,
    )
        .into_response()
}

/// Resume agent answering every `/query-resume` call with a fixed reply.
pub async fn spawn_upstream(status: StatusCode, body: &'static str) -> StubUpstream {
    let calls = Arc::new(AtomicUsize::new(0));
    let last_body = Arc::new(Mutex::new(None));
    let state = Arc::new(StubState {
        status,
        body,
        calls: calls.clone(),
        last_body: last_body.clone(),
    });

    let router = Router::new()
        .route("/query-resume", post(query_resume))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    StubUpstream {
        url: format!("http://{}", addr),
        calls,
        last_body,
    }
}

/// A base url nothing is listening on.
pub fn dead_upstream_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn config(upstream_url: &str, api_key: &str) -> GatewayConfig {
    GatewayConfig {
        api_key: api_key.to_string(),
        frontend_origin: ORIGIN.to_string(),
        upstream_url: upstream_url.to_string(),
        ..GatewayConfig::default()
    }
}

fn state(config: GatewayConfig) -> Arc<AppState> {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    Arc::new(AppState::new(config, client))
}

/// Full application, CORS included.
pub fn gateway(config: GatewayConfig) -> Router {
    app(state(config)).unwrap()
}

/// Router without the CORS layer, so OPTIONS reaches the pipeline.
pub fn bare_gateway(config: GatewayConfig) -> Router {
    build_router(state(config))
}

pub fn resume_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/agent/resume")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn resume_post_with_key(body: &str, key: &str) -> Request<Body> {
    let mut req = resume_post(body);
    req.headers_mut().insert("x-api-key", key.parse().unwrap());
    req
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
