//! The sync endpoint: one logical resource exposing the whole task
//! collection as fetch (GET) and replace-all (POST), plus an SSE channel
//! pushing the collection on every change.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::sync::broadcast;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::models::Task;
use crate::store::FileStore;

/// Capacity of the change channel. A lagging SSE subscriber skips to
/// the newest snapshot, which is always a complete collection.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FileStore>,
    /// Fired with the full collection after every successful replace.
    pub changes: broadcast::Sender<Vec<Task>>,
    pub cors_origin: String,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            store: Arc::new(FileStore::new(&config.data_file)),
            changes,
            cors_origin: config.cors_origin.clone(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/tasks",
            get(handlers::get_tasks).post(handlers::replace_tasks),
        )
        .route("/api/tasks/updates", get(handlers::task_updates))
        .layer(from_fn_with_state(state.clone(), cors_middleware))
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let state = AppState::new(&config);
    let router = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, data_file = %config.data_file.display(), "taskboard server listening");
    axum::serve(listener, router).await?;

    Ok(())
}

/// Grants the configured UI origin cross-origin access, including the
/// OPTIONS preflight. Other origins get no CORS headers.
async fn cors_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let allowed = origin.as_deref() == Some(state.cors_origin.as_str());

    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        if allowed {
            if let Some(value) = origin.and_then(|o| HeaderValue::from_str(&o).ok()) {
                resp.headers_mut()
                    .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
                resp.headers_mut().insert(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static("GET,POST,OPTIONS"),
                );
                resp.headers_mut().insert(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static("content-type"),
                );
            }
        }
        return resp;
    }

    let mut resp = next.run(req).await;
    if allowed {
        if let Some(value) = origin.and_then(|o| HeaderValue::from_str(&o).ok()) {
            resp.headers_mut()
                .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
            resp.headers_mut()
                .insert(header::VARY, HeaderValue::from_static("Origin"));
        }
    }
    resp
}
