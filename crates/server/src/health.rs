use std::sync::Arc;

use agenda_agent::AgentRuntime;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    runtime: Arc<AgentRuntime>,
    model: String,
}

impl HealthState {
    pub fn new(runtime: Arc<AgentRuntime>, model: impl Into<String>) -> Self {
        Self { runtime, model: model.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub active_sessions: usize,
    pub model: String,
    pub default_timezone: String,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/healthz", get(health)).with_state(state)
}

/// Liveness only. Provider reachability is checked by `agenda smoke`.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        ok: true,
        active_sessions: state.runtime.active_sessions().await,
        model: state.model.clone(),
        default_timezone: state.runtime.settings().default_timezone.clone(),
        checked_at: Utc::now().to_rfc3339(),
    };
    (StatusCode::OK, Json(payload))
}
