use std::convert::Infallible;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::AppState;
use crate::error::Error;
use crate::models::{find_duplicate_id, Task};

/// Structured error reply. Store failures map to 500, malformed
/// payloads to 400; handlers never panic on I/O.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match err {
            Error::DuplicateTaskId(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.detail }))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct Ack {
    pub message: &'static str,
}

/// GET /api/tasks — the current full collection, `[]` included.
pub async fn get_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.store.read()?;
    debug!(count = tasks.len(), "served task collection");
    Ok(Json(tasks))
}

/// POST /api/tasks — replace the whole collection. The payload must
/// parse as a task array with unique ids; otherwise the store is left
/// untouched and the client gets a 400.
pub async fn replace_tasks(
    State(state): State<AppState>,
    payload: Result<Json<Vec<Task>>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let Json(tasks) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected malformed replace payload");
        ApiError::bad_request(rejection.body_text())
    })?;

    if let Some(id) = find_duplicate_id(&tasks) {
        return Err(Error::DuplicateTaskId(id.to_string()).into());
    }

    state.store.write(&tasks)?;
    debug!(count = tasks.len(), "replaced task collection");

    // Subscribers are optional; send only fails with none connected.
    let _ = state.changes.send(tasks);

    Ok(Json(Ack {
        message: "Tasks updated",
    }))
}

/// GET /api/tasks/updates — long-lived SSE stream. The current
/// collection goes out immediately on connect, then one event per
/// change. Dropping the response releases the subscription.
pub async fn task_updates(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.changes.subscribe();

    let initial: Vec<Result<Event, Infallible>> = match state.store.read() {
        Ok(tasks) => collection_event(&tasks).map(Ok).into_iter().collect(),
        Err(err) => {
            warn!(error = %err, "skipping initial snapshot for subscriber");
            Vec::new()
        }
    };

    let rest = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(tasks) => {
                    if let Some(event) = collection_event(&tasks) {
                        return Some((Ok(event), rx));
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Snapshots are complete, so only the newest matters.
                    debug!(skipped, "subscriber lagged behind change channel");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream::iter(initial).chain(rest)).keep_alive(KeepAlive::default())
}

fn collection_event(tasks: &[Task]) -> Option<Event> {
    match serde_json::to_string(tasks) {
        Ok(body) => Some(Event::default().data(body)),
        Err(err) => {
            warn!(error = %err, "could not serialize collection for push");
            None
        }
    }
}
