//! JSON routes for the booking agent.
//!
//! - `POST /agent/start`   open a session and return the greeting
//! - `POST /agent/chat`    run one turn for `{session_id, message}`
//! - `POST /agent/end`     drop a session
//! - `POST /events/create` create an event directly, bypassing the conversation
//! - `POST /email/send`    send a message directly

use std::sync::Arc;

use agenda_agent::{AgentRuntime, StartedSession, TurnResponse};
use agenda_core::domain::booking::{CreatedEvent, EmailMessage, EventRequest, SentEmail, ToolResult};
use agenda_core::domain::session::SessionId;
use agenda_core::errors::{ApplicationError, InterfaceError};
use agenda_core::gateway::{CalendarGateway, MailGateway};
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiState {
    runtime: Arc<AgentRuntime>,
    calendar: Arc<dyn CalendarGateway>,
    mail: Arc<dyn MailGateway>,
}

impl ApiState {
    pub fn new(
        runtime: Arc<AgentRuntime>,
        calendar: Arc<dyn CalendarGateway>,
        mail: Arc<dyn MailGateway>,
    ) -> Self {
        Self { runtime, calendar, mail }
    }
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: SessionId,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EndRequest {
    pub session_id: SessionId,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct EndResponse {
    pub ended: bool,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    pub correlation_id: String,
}

pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/agent/start", post(start_session))
        .route("/agent/chat", post(chat))
        .route("/agent/end", post(end_session))
        .route("/events/create", post(create_event))
        .route("/email/send", post(send_email))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn start_session(State(state): State<ApiState>) -> Json<StartedSession> {
    Json(state.runtime.start_session().await)
}

pub async fn chat(
    State(state): State<ApiState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<TurnResponse> {
    let correlation_id = correlation_id();
    state
        .runtime
        .submit_turn(&request.session_id, &request.message)
        .await
        .map(Json)
        .map_err(|error| reject(error, correlation_id))
}

pub async fn end_session(
    State(state): State<ApiState>,
    Json(request): Json<EndRequest>,
) -> ApiResult<EndResponse> {
    let correlation_id = correlation_id();
    state
        .runtime
        .end_session(&request.session_id)
        .await
        .map(|()| Json(EndResponse { ended: true }))
        .map_err(|error| reject(error, correlation_id))
}

pub async fn create_event(
    State(state): State<ApiState>,
    Json(request): Json<EventRequest>,
) -> Json<ToolResult<CreatedEvent>> {
    let result = state.calendar.create_event(&request).await;
    info!(
        event_name = "api.events.create",
        correlation_id = %correlation_id(),
        ok = result.ok,
        attendee_count = request.attendees.len(),
    );
    Json(result)
}

pub async fn send_email(
    State(state): State<ApiState>,
    Json(message): Json<EmailMessage>,
) -> Json<ToolResult<SentEmail>> {
    let result = state.mail.send(&message).await;
    info!(
        event_name = "api.email.send",
        correlation_id = %correlation_id(),
        ok = result.ok,
        recipient_count = message.to.len(),
    );
    Json(result)
}

fn correlation_id() -> String {
    format!("req-{}", Uuid::new_v4().simple())
}

fn reject(error: ApplicationError, correlation_id: String) -> (StatusCode, Json<ApiError>) {
    let interface = error.into_interface(correlation_id);
    let status = match &interface {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
    };
    warn!(
        event_name = "api.request.rejected",
        correlation_id = %interface.correlation_id(),
        status = status.as_u16(),
        error = %interface,
    );

    (
        status,
        Json(ApiError {
            error: interface.error_code().to_string(),
            message: interface.user_message().to_string(),
            correlation_id: interface.correlation_id().to_string(),
        }),
    )
}
