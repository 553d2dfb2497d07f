//! System and health endpoints.

use axum::extract::{Json, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::state::AppState;
use crate::types::HealthResponse;

/// Server status, version and session count.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_secs(),
        active_sessions: state.context().active_sessions(),
    })
}

/// Prometheus metrics in text exposition format.
pub async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .metrics()
        .render(state.context().active_sessions(), state.uptime_secs());
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
