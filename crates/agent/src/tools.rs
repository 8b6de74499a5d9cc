use std::sync::Arc;

use agenda_core::domain::booking::{BusyInterval, EventRequest, ToolResult};
use agenda_core::domain::session::Session;
use agenda_core::domain::slots::SlotKey;
use agenda_core::flows::FlowEvent;
use agenda_core::gateway::{BusyQuery, CalendarGateway, MailGateway};
use agenda_core::render::{compose_invite, render_confirmation};
use agenda_core::time::resolve_timezone;
use agenda_core::validation::{describe, missing_or_invalid};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::booking::{advance, present_confirmation};
use crate::guardrails::{GuardrailDecision, GuardrailIntent, GuardrailPolicy};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AvailabilityReport {
    pub reply: String,
    /// `None` when the provider was not queried or failed.
    pub busy: Option<Vec<BusyInterval>>,
}

/// Side-effecting actions the agent may take on behalf of a session.
pub struct ToolBox {
    calendar: Arc<dyn CalendarGateway>,
    mail: Arc<dyn MailGateway>,
    guardrails: GuardrailPolicy,
    default_timezone: String,
    default_zone: Tz,
}

impl ToolBox {
    pub fn new(
        calendar: Arc<dyn CalendarGateway>,
        mail: Arc<dyn MailGateway>,
        guardrails: GuardrailPolicy,
        default_timezone: impl Into<String>,
    ) -> Self {
        let default_timezone = default_timezone.into();
        let default_zone = resolve_timezone(&default_timezone).unwrap_or(Tz::UTC);
        Self { calendar, mail, guardrails, default_timezone, default_zone }
    }

    pub fn guardrails(&self) -> &GuardrailPolicy {
        &self.guardrails
    }

    pub fn default_timezone(&self) -> &str {
        &self.default_timezone
    }

    pub fn default_zone(&self) -> Tz {
        self.default_zone
    }

    pub async fn check_availability(&self, session: &Session) -> AvailabilityReport {
        let slots = &session.slots;
        let (Some(start_iso), Some(end_iso), Some(timezone)) = (
            slots.text(SlotKey::StartIso),
            slots.text(SlotKey::EndIso),
            slots.text(SlotKey::Timezone),
        ) else {
            return AvailabilityReport {
                reply: "I need start time, end time, and timezone to check availability."
                    .to_string(),
                busy: None,
            };
        };

        let query = BusyQuery {
            start_iso: start_iso.to_string(),
            end_iso: end_iso.to_string(),
            timezone: timezone.to_string(),
        };
        match self.calendar.busy_intervals(&query).await {
            Ok(busy) => {
                info!(
                    event_name = "tool.check_availability.completed",
                    session_id = %session.id,
                    busy_count = busy.len(),
                );
                let reply = if busy.is_empty() {
                    "You're free at that time."
                } else {
                    "That time conflicts with another event."
                };
                AvailabilityReport { reply: reply.to_string(), busy: Some(busy) }
            }
            Err(error) => {
                warn!(
                    event_name = "tool.check_availability.failed",
                    session_id = %session.id,
                    error = %error,
                );
                AvailabilityReport { reply: format!("Availability check failed: {error}"), busy: None }
            }
        }
    }

    /// Creates the event for the confirmed slots. Without a pending
    /// confirmation the session is moved into confirmation instead and no
    /// provider call is made.
    pub async fn create_event(&self, session: &mut Session) -> String {
        let intent = GuardrailIntent::CreateEvent { awaiting_confirm: session.awaiting_confirm() };
        if let GuardrailDecision::Degrade { reason_code, .. } | GuardrailDecision::Deny { reason_code, .. } =
            self.guardrails.evaluate(&intent)
        {
            info!(
                event_name = "guardrail.create_event.gated",
                session_id = %session.id,
                action = intent.action_key(),
                reason_code,
            );
            return self.confirm_or_report_missing(session);
        }

        let issues = missing_or_invalid(&session.slots, self.default_zone);
        if !issues.is_empty() {
            advance(session, FlowEvent::CreateFailed);
            return format!("Still missing: {}.", describe(&issues));
        }

        let request = self.event_request(session);
        let result = self.calendar.create_event(&request).await;
        if result.ok {
            info!(
                event_name = "tool.create_event.completed",
                session_id = %session.id,
                attendee_count = request.attendees.len(),
            );
        } else {
            warn!(
                event_name = "tool.create_event.failed",
                session_id = %session.id,
                error = result.error.as_deref().unwrap_or_default(),
            );
        }

        let reply = match result.succeeded() {
            Some(created) => {
                if let Some(link) = created.link.as_deref().filter(|link| !link.trim().is_empty()) {
                    session.slots.link = Some(link.to_string());
                }
                advance(session, FlowEvent::CreateSucceeded);
                "Event created.".to_string()
            }
            None => {
                advance(session, FlowEvent::CreateFailed);
                match result.error.as_deref() {
                    Some(error) => format!("Failed to create event: {error}"),
                    None => "Failed to create event.".to_string(),
                }
            }
        };
        session.created_event = Some(result);
        reply
    }

    /// Sends the invitation for the event created earlier in this turn.
    pub async fn send_email(&self, session: &mut Session, approved: bool) -> String {
        let intent = GuardrailIntent::SendEmail {
            approved,
            event_created: session.created_event_data().is_some(),
            attendee_count: session.slots.attendees.len(),
        };
        if let GuardrailDecision::Deny { reason_code, user_message, .. }
        | GuardrailDecision::Degrade { reason_code, user_message, .. } =
            self.guardrails.evaluate(&intent)
        {
            info!(
                event_name = "guardrail.send_email.denied",
                session_id = %session.id,
                action = intent.action_key(),
                reason_code,
            );
            return user_message;
        }

        let link = session
            .created_event_data()
            .and_then(|created| created.link.clone())
            .filter(|link| !link.trim().is_empty());
        let message = compose_invite(&session.slots, link.as_deref(), &self.default_timezone);
        let result = self.mail.send(&message).await;
        if result.ok {
            info!(
                event_name = "tool.send_email.completed",
                session_id = %session.id,
                recipient_count = message.to.len(),
            );
        } else {
            warn!(
                event_name = "tool.send_email.failed",
                session_id = %session.id,
                error = failure_text(&result),
            );
        }

        let reply = if result.ok {
            advance(session, FlowEvent::EmailSent);
            "Event created and email sent.".to_string()
        } else {
            format!("Event created, but the email failed: {}", failure_text(&result))
        };
        session.email_result = Some(result);
        reply
    }

    fn confirm_or_report_missing(&self, session: &mut Session) -> String {
        let issues = missing_or_invalid(&session.slots, self.default_zone);
        let summary = render_confirmation(&session.slots, &self.default_timezone);
        present_confirmation(session, summary, &issues)
    }

    fn event_request(&self, session: &Session) -> EventRequest {
        let mut request = EventRequest::from_slots(&session.slots, &self.default_timezone);
        if let Some(link) = session.slots.text(SlotKey::Link) {
            let description = request.description.take().unwrap_or_default();
            request.description = Some(if description.to_lowercase().contains("link") {
                description
            } else if description.trim().is_empty() {
                format!("Link: {link}")
            } else {
                format!("{description}\nLink: {link}")
            });
        }
        request
    }
}

fn failure_text<T>(result: &ToolResult<T>) -> &str {
    result.error.as_deref().unwrap_or("unknown error")
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use agenda_core::domain::booking::BusyInterval;
    use agenda_core::domain::session::{Session, SessionId};
    use agenda_core::domain::slots::Slots;
    use agenda_core::flows::FlowState;

    use super::fakes::{RecordingCalendar, RecordingMailer};
    use super::ToolBox;
    use crate::booking::present_confirmation;
    use crate::guardrails::GuardrailPolicy;

    fn complete_slots() -> Slots {
        Slots {
            title: Some("Sync".to_string()),
            start_iso: Some("2025-08-18T10:00:00".to_string()),
            end_iso: Some("2025-08-18T10:30:00".to_string()),
            timezone: Some("America/Chicago".to_string()),
            attendees: vec!["ada@example.com".to_string()],
            link: Some("https://meet.example.com/x".to_string()),
            ..Slots::default()
        }
    }

    fn toolbox(calendar: Arc<RecordingCalendar>, mailer: Arc<RecordingMailer>) -> ToolBox {
        ToolBox::new(calendar, mailer, GuardrailPolicy::default(), "America/Chicago")
    }

    fn session_with(slots: Slots) -> Session {
        let mut session = Session::new(SessionId("t".to_string()));
        session.slots = slots;
        session
    }

    #[tokio::test]
    async fn create_without_confirmation_only_presents_summary() {
        let calendar = Arc::new(RecordingCalendar::default());
        let tools = toolbox(calendar.clone(), Arc::new(RecordingMailer::default()));
        let mut session = session_with(complete_slots());

        let reply = tools.create_event(&mut session).await;

        assert!(reply.starts_with("Create “Sync” from 2025-08-18T10:00:00"));
        assert!(session.awaiting_confirm());
        assert!(session.created_event.is_none());
        assert!(calendar.created.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn confirmed_create_records_provider_event_id() {
        let calendar = Arc::new(RecordingCalendar::default());
        let tools = toolbox(calendar.clone(), Arc::new(RecordingMailer::default()));
        let mut session = session_with(Slots {
            attendees: vec!["a@example.com".to_string()],
            link: None,
            ..complete_slots()
        });
        present_confirmation(&mut session, "ok?".to_string(), &[]);

        let reply = tools.create_event(&mut session).await;

        assert_eq!(reply, "Event created.");
        let created = session.created_event.as_ref().expect("created event recorded");
        assert!(created.ok);
        assert_eq!(created.data.as_ref().map(|event| event.id.as_str()), Some("evt-1"));
        let requests = calendar.created.lock().expect("lock");
        assert_eq!(requests[0].title, "Sync");
        assert_eq!(requests[0].timezone, "America/Chicago");
        assert_eq!(requests[0].attendees, vec!["a@example.com"]);
    }

    #[tokio::test]
    async fn confirmed_create_appends_link_to_description() {
        let calendar = Arc::new(RecordingCalendar {
            link: Some("https://calendar.example.com/evt-1".to_string()),
            ..RecordingCalendar::default()
        });
        let tools = toolbox(calendar.clone(), Arc::new(RecordingMailer::default()));
        let mut session = session_with(Slots {
            description: Some("Agenda attached".to_string()),
            ..complete_slots()
        });
        present_confirmation(&mut session, "ok?".to_string(), &[]);

        let reply = tools.create_event(&mut session).await;

        assert_eq!(reply, "Event created.");
        assert_eq!(session.state, FlowState::Created);
        assert_eq!(session.confirm_summary, None);
        assert_eq!(session.slots.link.as_deref(), Some("https://calendar.example.com/evt-1"));
        let created = calendar.created.lock().expect("lock");
        assert_eq!(
            created[0].description.as_deref(),
            Some("Agenda attached\nLink: https://meet.example.com/x")
        );
    }

    #[tokio::test]
    async fn description_mentioning_a_link_is_left_alone() {
        let calendar = Arc::new(RecordingCalendar::default());
        let tools = toolbox(calendar.clone(), Arc::new(RecordingMailer::default()));
        let mut session = session_with(Slots {
            description: Some("Link is in the invite".to_string()),
            ..complete_slots()
        });
        present_confirmation(&mut session, "ok?".to_string(), &[]);

        tools.create_event(&mut session).await;

        let created = calendar.created.lock().expect("lock");
        assert_eq!(created[0].description.as_deref(), Some("Link is in the invite"));
    }

    #[tokio::test]
    async fn provider_failure_returns_to_collecting() {
        let calendar = Arc::new(RecordingCalendar {
            fail_create: Some("quota exceeded".to_string()),
            ..RecordingCalendar::default()
        });
        let tools = toolbox(calendar, Arc::new(RecordingMailer::default()));
        let mut session = session_with(complete_slots());
        present_confirmation(&mut session, "ok?".to_string(), &[]);

        let reply = tools.create_event(&mut session).await;

        assert_eq!(reply, "Failed to create event: quota exceeded");
        assert_eq!(session.state, FlowState::Collecting);
        assert_eq!(session.created_event.as_ref().map(|result| result.ok), Some(false));
    }

    #[tokio::test]
    async fn create_revalidates_before_calling_provider() {
        let calendar = Arc::new(RecordingCalendar::default());
        let tools = toolbox(calendar.clone(), Arc::new(RecordingMailer::default()));
        let mut session = session_with(complete_slots());
        present_confirmation(&mut session, "ok?".to_string(), &[]);
        session.slots.end_iso = Some("2025-08-18T09:00:00".to_string());

        let reply = tools.create_event(&mut session).await;

        assert_eq!(reply, "Still missing: end_iso (must be after start_iso).");
        assert!(calendar.created.lock().expect("lock").is_empty());
        assert!(!session.awaiting_confirm());
    }

    #[tokio::test]
    async fn email_without_attendees_is_skipped() {
        let mailer = Arc::new(RecordingMailer::default());
        let tools = toolbox(Arc::new(RecordingCalendar::default()), mailer.clone());
        let mut session = session_with(Slots { attendees: Vec::new(), ..complete_slots() });
        present_confirmation(&mut session, "ok?".to_string(), &[]);
        tools.create_event(&mut session).await;

        let reply = tools.send_email(&mut session, true).await;

        assert_eq!(reply, "Event created. (No attendees to email.)");
        assert!(mailer.sent.lock().expect("lock").is_empty());
        assert!(session.email_result.is_none());
    }

    #[tokio::test]
    async fn email_before_create_is_refused() {
        let mailer = Arc::new(RecordingMailer::default());
        let tools = toolbox(Arc::new(RecordingCalendar::default()), mailer.clone());
        let mut session = session_with(complete_slots());

        assert_eq!(
            tools.send_email(&mut session, true).await,
            "I couldn't find the event I just created."
        );
        assert_eq!(tools.send_email(&mut session, false).await, "Okay, no email sent.");
        assert!(mailer.sent.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn email_uses_created_event_link_and_reports_failure() {
        let calendar = Arc::new(RecordingCalendar {
            link: Some("https://calendar.example.com/evt-1".to_string()),
            ..RecordingCalendar::default()
        });
        let mailer =
            Arc::new(RecordingMailer { fail_with: Some("smtp down".to_string()), ..Default::default() });
        let tools = toolbox(calendar, mailer.clone());
        let mut session = session_with(complete_slots());
        present_confirmation(&mut session, "ok?".to_string(), &[]);
        tools.create_event(&mut session).await;

        let reply = tools.send_email(&mut session, true).await;

        assert_eq!(reply, "Event created, but the email failed: smtp down");
        assert_eq!(session.state, FlowState::Created);
        let sent = mailer.sent.lock().expect("lock");
        assert_eq!(sent[0].subject, "Invite: Sync");
        assert!(sent[0].body_text.contains("Link: https://calendar.example.com/evt-1"));
    }

    #[tokio::test]
    async fn availability_needs_times_and_zone() {
        let calendar = Arc::new(RecordingCalendar {
            busy: vec![BusyInterval {
                start: "2025-08-18T15:00:00Z".to_string(),
                end: "2025-08-18T15:30:00Z".to_string(),
            }],
            ..RecordingCalendar::default()
        });
        let tools = toolbox(calendar.clone(), Arc::new(RecordingMailer::default()));

        let partial = session_with(Slots { timezone: None, ..complete_slots() });
        let report = tools.check_availability(&partial).await;
        assert_eq!(report.reply, "I need start time, end time, and timezone to check availability.");
        assert!(calendar.queried.lock().expect("lock").is_empty());

        let report = tools.check_availability(&session_with(complete_slots())).await;
        assert_eq!(report.reply, "That time conflicts with another event.");
        assert_eq!(report.busy.map(|busy| busy.len()), Some(1));
    }
}
