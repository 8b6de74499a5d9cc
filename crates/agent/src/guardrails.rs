#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailIntent {
    /// Committal create. Only allowed while a confirmation is pending.
    CreateEvent { awaiting_confirm: bool },
    SendEmail { approved: bool, event_created: bool, attendee_count: usize },
    /// An affirmative reply with complete slots but no summary shown yet.
    ImplicitConfirmation { after_booking: bool },
}

impl GuardrailIntent {
    pub fn action_key(&self) -> &'static str {
        match self {
            Self::CreateEvent { .. } => "calendar.create_event",
            Self::SendEmail { .. } => "email.send_invite",
            Self::ImplicitConfirmation { .. } => "session.implicit_confirmation",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow,
    Deny { reason_code: &'static str, user_message: String, fallback_path: &'static str },
    Degrade { reason_code: &'static str, user_message: String, fallback_path: &'static str },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardrailPolicy {
    pub implicit_confirmation: bool,
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self { implicit_confirmation: true }
    }
}

impl GuardrailPolicy {
    pub fn evaluate(&self, intent: &GuardrailIntent) -> GuardrailDecision {
        match intent {
            GuardrailIntent::CreateEvent { awaiting_confirm: true } => GuardrailDecision::Allow,
            GuardrailIntent::CreateEvent { awaiting_confirm: false } => GuardrailDecision::Degrade {
                reason_code: "confirmation_required",
                user_message: "I need an explicit confirmation before creating the event."
                    .to_string(),
                fallback_path: "present_confirmation",
            },
            GuardrailIntent::SendEmail { approved: false, .. } => GuardrailDecision::Deny {
                reason_code: "email_declined",
                user_message: "Okay, no email sent.".to_string(),
                fallback_path: "none",
            },
            GuardrailIntent::SendEmail { event_created: false, .. } => GuardrailDecision::Deny {
                reason_code: "no_event_created",
                user_message: "I couldn't find the event I just created.".to_string(),
                fallback_path: "create_event",
            },
            GuardrailIntent::SendEmail { attendee_count: 0, .. } => GuardrailDecision::Deny {
                reason_code: "no_attendees",
                user_message: "Event created. (No attendees to email.)".to_string(),
                fallback_path: "none",
            },
            GuardrailIntent::SendEmail { .. } => GuardrailDecision::Allow,
            GuardrailIntent::ImplicitConfirmation { after_booking: true } => {
                GuardrailDecision::Degrade {
                    reason_code: "rebooking_requires_confirmation",
                    user_message: "Please confirm the summary first.".to_string(),
                    fallback_path: "policy_step",
                }
            }
            GuardrailIntent::ImplicitConfirmation { .. } if self.implicit_confirmation => {
                GuardrailDecision::Allow
            }
            GuardrailIntent::ImplicitConfirmation { .. } => GuardrailDecision::Degrade {
                reason_code: "implicit_confirmation_disabled",
                user_message: "Please confirm the summary first.".to_string(),
                fallback_path: "policy_step",
            },
        }
    }
}
