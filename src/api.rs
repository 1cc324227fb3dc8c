//! HTTP API for tasks. REST endpoints over the shared [`TaskStore`].

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use crate::error::TaskError;
use crate::tasks::TaskStore;
use crate::tasks::model::{ListQuery, NewTask, UpdateBody, UpdateRequest, parse_date};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<TaskStore>,
}

/// Build the Axum router with task REST routes and CORS for `origins`.
///
/// An origin of `*` allows any origin.
pub fn task_routes(store: Arc<TaskStore>, origins: &[String]) -> Router {
    let state = ApiState { store };

    Router::new()
        .route("/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/toggle", post(toggle_task))
        .layer(cors_layer(origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "daily-tasks"
    }))
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn error_body(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "error": message.into() }))
}

/// Translate a store error into a status code and JSON body.
fn task_error(err: TaskError) -> (StatusCode, Json<Value>) {
    match err {
        TaskError::InvalidDate { .. } => (
            StatusCode::BAD_REQUEST,
            error_body("❌ Cannot add tasks in the past."),
        ),
        TaskError::EmptyTitle => (
            StatusCode::BAD_REQUEST,
            error_body("❌ Task title must not be empty."),
        ),
        TaskError::NotFound { .. } => (StatusCode::NOT_FOUND, error_body("❌ Task not found")),
        TaskError::Database(e) => {
            warn!(error = %e, "Task API storage failure");
            (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()))
        }
    }
}

/// Report a body that axum could not decode in the usual error shape.
fn rejected_body(rejection: JsonRejection) -> (StatusCode, Json<Value>) {
    (rejection.status(), error_body(rejection.body_text()))
}

fn parse_id(raw: &str) -> Result<i64, (StatusCode, Json<Value>)> {
    raw.parse::<i64>()
        .map_err(|_| (StatusCode::BAD_REQUEST, error_body("Invalid task ID")))
}

// ── REST Endpoints ──────────────────────────────────────────────────────

async fn list_tasks(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let date = match query.date.as_deref().map(parse_date).transpose() {
        Ok(date) => date,
        Err(e) => return (StatusCode::BAD_REQUEST, error_body(e.to_string())),
    };

    match state.store.list_by_date(date).await {
        Ok(tasks) => (StatusCode::OK, Json(json!(tasks))),
        Err(e) => task_error(e),
    }
}

async fn create_task(
    State(state): State<ApiState>,
    body: Result<Json<NewTask>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected_body(rejection),
    };

    match state.store.create(&body.title, body.date).await {
        Ok(task) => {
            info!(id = task.id, "Task created via API");
            (StatusCode::CREATED, Json(json!(task)))
        }
        Err(e) => task_error(e),
    }
}

async fn get_task(State(state): State<ApiState>, Path(id): Path<String>) -> impl IntoResponse {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.store.get(id).await {
        Ok(task) => (StatusCode::OK, Json(json!(task))),
        Err(e) => task_error(e),
    }
}

async fn update_task(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateBody>, JsonRejection>,
) -> impl IntoResponse {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let request = match body.map(|Json(body)| UpdateRequest::try_from(body)) {
        Ok(Ok(request)) => request,
        Ok(Err(e)) => return (StatusCode::BAD_REQUEST, error_body(e.to_string())),
        Err(rejection) => return rejected_body(rejection),
    };

    let result = match request {
        UpdateRequest::Completion { done } => state.store.set_completion(id, done).await,
        UpdateRequest::Replace(update) => state.store.update(id, update).await,
    };

    match result {
        Ok(task) => (StatusCode::OK, Json(json!(task))),
        Err(e) => task_error(e),
    }
}

async fn toggle_task(State(state): State<ApiState>, Path(id): Path<String>) -> impl IntoResponse {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.store.toggle_completion(id).await {
        Ok(task) => (StatusCode::OK, Json(json!(task))),
        Err(e) => task_error(e),
    }
}

async fn delete_task(State(state): State<ApiState>, Path(id): Path<String>) -> impl IntoResponse {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.store.delete(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": format!("🗑️ Task {id} deleted successfully") })),
        ),
        Err(e) => task_error(e),
    }
}
