use agenda_core::domain::booking::{
    BusyInterval, CreatedEvent, EmailMessage, EventRequest, SentEmail, ToolResult,
};
use agenda_core::gateway::{BusyQuery, CalendarGateway, GatewayError, MailGateway};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

/// Calendar that accepts every event without contacting a provider. Useful
/// for local runs and for exercising the conversation end to end.
#[derive(Default)]
pub struct DryRunCalendar {
    created: Mutex<Vec<EventRequest>>,
}

impl DryRunCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn created(&self) -> Vec<EventRequest> {
        self.created.lock().await.clone()
    }
}

#[async_trait]
impl CalendarGateway for DryRunCalendar {
    async fn create_event(&self, request: &EventRequest) -> ToolResult<CreatedEvent> {
        let id = format!("dry-run-{}", uuid::Uuid::new_v4().simple());
        info!(
            event_name = "adapters.dry_run.event_created",
            event_id = %id,
            title = %request.title,
            start = %request.start_iso,
            attendee_count = request.attendees.len(),
        );
        self.created.lock().await.push(request.clone());
        ToolResult::success(CreatedEvent { id, link: None })
    }

    async fn busy_intervals(&self, query: &BusyQuery) -> Result<Vec<BusyInterval>, GatewayError> {
        info!(
            event_name = "adapters.dry_run.busy_queried",
            start = %query.start_iso,
            end = %query.end_iso,
        );
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct DryRunMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl DryRunMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MailGateway for DryRunMailer {
    async fn send(&self, message: &EmailMessage) -> ToolResult<SentEmail> {
        let id = format!("dry-run-{}", uuid::Uuid::new_v4().simple());
        info!(
            event_name = "adapters.dry_run.email_sent",
            message_id = %id,
            subject = %message.subject,
            recipient_count = message.to.len(),
        );
        self.sent.lock().await.push(message.clone());
        ToolResult::success(SentEmail { id })
    }
}
