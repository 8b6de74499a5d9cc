use std::sync::Arc;

use agenda_core::domain::booking::BusyInterval;
use agenda_core::domain::session::Session;
use agenda_core::domain::slots::SlotKey;
use agenda_core::flows::FlowState;
use agenda_core::render::render_confirmation;
use agenda_core::time::normalize_times;
use agenda_core::validation::missing_or_invalid;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::action::ActionDecision;
use crate::booking::present_confirmation;
use crate::conversation::{cheap_title, MessageSignals};
use crate::llm::LlmClient;
use crate::prompt::{render_policy_prompt, PromptContext};
use crate::tools::ToolBox;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PolicyOutcome {
    pub reply: String,
    /// True when this step created the event.
    pub created: bool,
    pub busy: Option<Vec<BusyInterval>>,
}

impl PolicyOutcome {
    fn reply(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), ..Self::default() }
    }
}

/// One model-directed step: ask the language model for a single action and
/// carry it out against the session.
pub struct PolicyStep {
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolBox>,
    history_window: usize,
}

impl PolicyStep {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Arc<ToolBox>, history_window: usize) -> Self {
        Self { llm, tools, history_window }
    }

    pub async fn run(&self, session: &mut Session, signals: &MessageSignals) -> PolicyOutcome {
        signals.apply_to(&mut session.slots);
        normalize_times(&mut session.slots, self.tools.default_timezone());

        let today = Utc::now().with_timezone(&self.tools.default_zone()).date_naive();
        let prompt = render_policy_prompt(&PromptContext {
            today,
            default_timezone: self.tools.default_timezone(),
            slots: &session.slots,
            latest_message: session.message(),
            transcript: session.recent_history(self.history_window),
        });

        let raw = match self.llm.complete(&prompt).await {
            Ok(raw) => raw,
            Err(error) => {
                warn!(
                    event_name = "agent.policy.completion_failed",
                    session_id = %session.id,
                    model = self.llm.model_id(),
                    error = %error,
                );
                return PolicyOutcome::reply(format!(
                    "I couldn't reach the language model ({error}). Please try again."
                ));
            }
        };

        match ActionDecision::parse(&raw) {
            Ok(decision) => {
                info!(
                    event_name = "agent.policy.action_selected",
                    session_id = %session.id,
                    action = decision.tag(),
                );
                self.dispatch(session, decision).await
            }
            Err(error) => {
                debug!(
                    event_name = "agent.policy.fallback",
                    session_id = %session.id,
                    error = %error,
                );
                self.fallback(session)
            }
        }
    }

    async fn dispatch(&self, session: &mut Session, decision: ActionDecision) -> PolicyOutcome {
        match decision {
            ActionDecision::Ask { question } => PolicyOutcome::reply(
                question.unwrap_or_else(|| "What should I provide next?".to_string()),
            ),
            ActionDecision::Set(patch) => {
                patch.apply(&mut session.slots);
                normalize_times(&mut session.slots, self.tools.default_timezone());
                PolicyOutcome::reply(self.confirm_when_ready(session, None))
            }
            ActionDecision::Confirm { summary } => {
                PolicyOutcome::reply(self.confirm_when_ready(session, summary))
            }
            ActionDecision::CheckAvailability => {
                let report = self.tools.check_availability(session).await;
                PolicyOutcome { reply: report.reply, created: false, busy: report.busy }
            }
            ActionDecision::CreateEvent => {
                let reply = self.tools.create_event(session).await;
                PolicyOutcome { reply, created: session.state == FlowState::Created, busy: None }
            }
            ActionDecision::SendEmail { yes } => {
                PolicyOutcome::reply(self.tools.send_email(session, yes).await)
            }
            ActionDecision::Finish { message } => {
                PolicyOutcome::reply(message.unwrap_or_else(|| "All set.".to_string()))
            }
            ActionDecision::Unrecognized(_) => {
                PolicyOutcome::reply("Please provide the next detail.")
            }
        }
    }

    /// Used when the completion could not be decoded into an action.
    fn fallback(&self, session: &mut Session) -> PolicyOutcome {
        if !session.slots.is_filled(SlotKey::Title) {
            session.slots.title = Some(cheap_title(session.message()));
        }
        PolicyOutcome::reply(self.confirm_when_ready(session, None))
    }

    fn confirm_when_ready(&self, session: &mut Session, summary: Option<String>) -> String {
        let issues = missing_or_invalid(&session.slots, self.tools.default_zone());
        let summary = summary
            .unwrap_or_else(|| render_confirmation(&session.slots, self.tools.default_timezone()));
        present_confirmation(session, summary, &issues)
    }
}
