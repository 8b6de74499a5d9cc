use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::booking::{
    BusyInterval, CreatedEvent, EmailMessage, EventRequest, SentEmail, ToolResult,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("authorization expired or missing")]
    Unauthorized,
    #[error("provider returned {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),
    #[error("{0}")]
    Configuration(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyQuery {
    pub start_iso: String,
    pub end_iso: String,
    pub timezone: String,
}

#[async_trait]
pub trait CalendarGateway: Send + Sync {
    async fn create_event(&self, request: &EventRequest) -> ToolResult<CreatedEvent>;
    async fn busy_intervals(&self, query: &BusyQuery) -> Result<Vec<BusyInterval>, GatewayError>;
}

#[async_trait]
pub trait MailGateway: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> ToolResult<SentEmail>;
}
