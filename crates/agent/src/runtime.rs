use std::sync::Arc;
use std::time::{Duration, Instant};

use agenda_core::config::{AgentConfig, AppConfig};
use agenda_core::domain::booking::{BusyInterval, CreatedEvent, SentEmail, ToolResult};
use agenda_core::domain::session::{Role, Session, SessionId};
use agenda_core::domain::slots::{SlotKey, Slots};
use agenda_core::errors::{ApplicationError, DomainError};
use agenda_core::flows::{FlowEvent, FlowState};
use agenda_core::gateway::{CalendarGateway, MailGateway};
use agenda_core::render::render_confirmation;
use agenda_core::time::{canonicalize_times, normalize_times};
use agenda_core::validation::{missing_or_invalid, SlotIssue};
use serde::Serialize;
use tracing::{debug, info};

use crate::booking::{advance, present_confirmation};
use crate::conversation::{MessageSignals, SignalExtractor};
use crate::guardrails::{GuardrailDecision, GuardrailIntent, GuardrailPolicy};
use crate::llm::LlmClient;
use crate::policy::PolicyStep;
use crate::session::SessionStore;
use crate::tools::ToolBox;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub default_timezone: String,
    pub session_ttl: Duration,
    pub history_window: usize,
    pub implicit_confirmation: bool,
}

impl RuntimeSettings {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            default_timezone: config.default_timezone.clone(),
            session_ttl: Duration::from_secs(config.session_ttl_secs),
            history_window: config.history_window,
            implicit_confirmation: config.implicit_confirmation,
        }
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default().agent)
    }
}

pub struct AgentDependencies {
    pub llm: Arc<dyn LlmClient>,
    pub calendar: Arc<dyn CalendarGateway>,
    pub mail: Arc<dyn MailGateway>,
    pub store: Arc<dyn SessionStore>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StartedSession {
    pub session_id: SessionId,
    pub reply: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TurnData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<ToolResult<CreatedEvent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<ToolResult<SentEmail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busy: Option<Vec<BusyInterval>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TurnResponse {
    pub session_id: SessionId,
    pub reply: String,
    pub slots: Slots,
    /// True only when this turn created the event.
    pub done: bool,
    pub data: TurnData,
}

/// Drives the per-session booking conversation: local yes/no handling,
/// heuristic slot capture, and one model-directed step per turn.
pub struct AgentRuntime {
    store: Arc<dyn SessionStore>,
    tools: Arc<ToolBox>,
    policy: PolicyStep,
    extractor: SignalExtractor,
    settings: RuntimeSettings,
}

impl AgentRuntime {
    pub fn new(dependencies: AgentDependencies, settings: RuntimeSettings) -> Self {
        let guardrails =
            GuardrailPolicy { implicit_confirmation: settings.implicit_confirmation };
        let tools = Arc::new(ToolBox::new(
            dependencies.calendar,
            dependencies.mail,
            guardrails,
            settings.default_timezone.clone(),
        ));
        let policy =
            PolicyStep::new(dependencies.llm, tools.clone(), settings.history_window);

        Self {
            store: dependencies.store,
            tools,
            policy,
            extractor: SignalExtractor::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    pub async fn start_session(&self) -> StartedSession {
        let session = Session::new(SessionId::generate());
        let started =
            StartedSession { session_id: session.id.clone(), reply: session.reply.clone() };
        self.store.insert(session).await;
        info!(
            event_name = "agent.session.started",
            session_id = %started.session_id,
        );
        started
    }

    pub async fn submit_turn(
        &self,
        session_id: &SessionId,
        message: &str,
    ) -> Result<TurnResponse, ApplicationError> {
        if message.trim().is_empty() {
            return Err(DomainError::EmptyMessage.into());
        }
        let handle = self
            .store
            .get(session_id)
            .await
            .ok_or_else(|| ApplicationError::SessionNotFound(session_id.to_string()))?;

        let mut entry = handle.lock().await;
        if entry.is_closed() {
            return Err(ApplicationError::SessionNotFound(session_id.to_string()));
        }
        entry.touch(Instant::now());

        let response = self.run_turn(entry.session_mut(), message).await;
        entry.touch(Instant::now());

        info!(
            event_name = "agent.turn.completed",
            session_id = %session_id,
            state = ?entry.session().state,
            done = response.done,
        );
        Ok(response)
    }

    pub async fn end_session(&self, session_id: &SessionId) -> Result<(), ApplicationError> {
        if !self.store.remove(session_id).await {
            return Err(ApplicationError::SessionNotFound(session_id.to_string()));
        }
        info!(event_name = "agent.session.ended", session_id = %session_id);
        Ok(())
    }

    pub async fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now()).await
    }

    pub async fn sweep_expired_at(&self, now: Instant) -> usize {
        let expired = self.store.sweep(now, self.settings.session_ttl).await;
        for session_id in &expired {
            info!(event_name = "agent.session.reaped", session_id = %session_id);
        }
        expired.len()
    }

    pub async fn active_sessions(&self) -> usize {
        self.store.len().await
    }

    async fn run_turn(&self, session: &mut Session, message: &str) -> TurnResponse {
        if session.state == FlowState::Booked {
            advance(session, FlowEvent::Rearmed);
        }

        let text = message.trim().to_string();
        session.record(Role::User, text.clone());
        session.new_user_message = Some(text.clone());

        let signals = self.extractor.extract(&text);
        debug!(
            event_name = "agent.turn.signals",
            session_id = %session.id,
            affirmative = signals.affirmative,
            negative = signals.negative,
            skip_email = signals.skip_email,
            availability_request = signals.availability_request,
            email_count = signals.emails.len(),
        );

        let mut data = TurnData::default();
        let (reply, done) = if signals.availability_request {
            (self.availability_fast_path(session, &signals, &mut data).await, false)
        } else if session.awaiting_confirm() && signals.affirmative {
            self.commit(session, &signals, &mut data).await
        } else if session.awaiting_confirm() && signals.negative {
            advance(session, FlowEvent::Declined);
            ("Okay, what would you like to change?".to_string(), false)
        } else {
            self.continue_collecting(session, &signals, &mut data).await
        };

        session.reply = reply.clone();
        if !reply.is_empty() {
            session.record(Role::Assistant, reply.clone());
        }
        session.new_user_message = None;

        TurnResponse {
            session_id: session.id.clone(),
            reply,
            slots: session.slots.clone(),
            done,
            data,
        }
    }

    /// Availability questions skip the model. The default timezone is not
    /// assumed here, so an unstated zone is reported as missing.
    async fn availability_fast_path(
        &self,
        session: &mut Session,
        signals: &MessageSignals,
        data: &mut TurnData,
    ) -> String {
        signals.apply_to(&mut session.slots);
        canonicalize_times(&mut session.slots);

        let missing = [SlotKey::StartIso, SlotKey::EndIso, SlotKey::Timezone]
            .into_iter()
            .filter(|key| !session.slots.is_filled(*key))
            .map(SlotKey::as_str)
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return format!("Missing for availability check: {}.", missing.join(", "));
        }
        if missing_or_invalid(&session.slots, self.tools.default_zone())
            .contains(&SlotIssue::EndNotAfterStart)
        {
            return format!(
                "Missing for availability check: {}.",
                SlotIssue::EndNotAfterStart.label()
            );
        }

        let report = self.tools.check_availability(session).await;
        data.busy = report.busy;
        report.reply
    }

    async fn continue_collecting(
        &self,
        session: &mut Session,
        signals: &MessageSignals,
        data: &mut TurnData,
    ) -> (String, bool) {
        signals.apply_to(&mut session.slots);
        normalize_times(&mut session.slots, &self.settings.default_timezone);

        let issues = missing_or_invalid(&session.slots, self.tools.default_zone());
        if !session.awaiting_confirm() && signals.affirmative && issues.is_empty() {
            let intent = GuardrailIntent::ImplicitConfirmation {
                after_booking: session.completed_bookings > 0,
            };
            match self.tools.guardrails().evaluate(&intent) {
                GuardrailDecision::Allow => {
                    let summary =
                        render_confirmation(&session.slots, &self.settings.default_timezone);
                    present_confirmation(session, summary, &issues);
                    return self.commit(session, signals, data).await;
                }
                GuardrailDecision::Deny { reason_code, .. }
                | GuardrailDecision::Degrade { reason_code, .. } => {
                    debug!(
                        event_name = "guardrail.implicit_confirmation.skipped",
                        session_id = %session.id,
                        action = intent.action_key(),
                        reason_code,
                    );
                }
            }
        }

        let outcome = self.policy.run(session, signals).await;
        data.busy = outcome.busy;
        if outcome.created {
            return self.close_booking(session, signals, data).await;
        }
        (outcome.reply, false)
    }

    async fn commit(
        &self,
        session: &mut Session,
        signals: &MessageSignals,
        data: &mut TurnData,
    ) -> (String, bool) {
        let reply = self.tools.create_event(session).await;
        if session.state != FlowState::Created {
            data.event = session.created_event.clone();
            return (reply, false);
        }
        self.close_booking(session, signals, data).await
    }

    async fn close_booking(
        &self,
        session: &mut Session,
        signals: &MessageSignals,
        data: &mut TurnData,
    ) -> (String, bool) {
        data.event = session.created_event.clone();
        let reply = if signals.skip_email {
            "Event created. (Skipped email.)".to_string()
        } else {
            let reply = self.tools.send_email(session, true).await;
            data.email = session.email_result.clone();
            reply
        };
        advance(session, FlowEvent::BookingClosed);
        (reply, true)
    }
}
