use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::booking::{CreatedEvent, SentEmail, ToolResult};
use crate::domain::slots::Slots;
use crate::flows::FlowState;

pub const GREETING: &str = "Hi! What should I schedule?";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// One conversation. Only the turn that currently holds the session may
/// mutate it.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub slots: Slots,
    pub history: Vec<Turn>,
    pub state: FlowState,
    pub confirm_summary: Option<String>,
    pub created_event: Option<ToolResult<CreatedEvent>>,
    pub email_result: Option<ToolResult<SentEmail>>,
    pub reply: String,
    pub new_user_message: Option<String>,
    /// Bookings closed in this session. A re-armed session keeps its slots,
    /// so later creates need an explicit confirmation.
    pub completed_bookings: u32,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            slots: Slots::default(),
            history: Vec::new(),
            state: FlowState::Collecting,
            confirm_summary: None,
            created_event: None,
            email_result: None,
            reply: GREETING.to_string(),
            new_user_message: None,
            completed_bookings: 0,
        }
    }

    pub fn awaiting_confirm(&self) -> bool {
        self.state == FlowState::AwaitingConfirm
    }

    pub fn record(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(Turn { role, content: content.into() });
    }

    pub fn recent_history(&self, window: usize) -> &[Turn] {
        let start = self.history.len().saturating_sub(window);
        &self.history[start..]
    }

    pub fn message(&self) -> &str {
        self.new_user_message.as_deref().unwrap_or_default()
    }

    pub fn created_event_data(&self) -> Option<&CreatedEvent> {
        self.created_event.as_ref().and_then(ToolResult::succeeded)
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, Session, SessionId, GREETING};
    use crate::flows::FlowState;

    #[test]
    fn new_session_greets_and_collects() {
        let session = Session::new(SessionId("s-1".to_string()));
        assert_eq!(session.reply, GREETING);
        assert_eq!(session.state, FlowState::Collecting);
        assert!(!session.awaiting_confirm());
        assert!(session.history.is_empty());
        assert_eq!(session.completed_bookings, 0);
    }

    #[test]
    fn recent_history_is_bounded() {
        let mut session = Session::new(SessionId::generate());
        for index in 0..12 {
            let role = if index % 2 == 0 { Role::User } else { Role::Assistant };
            session.record(role, format!("turn {index}"));
        }

        let window = session.recent_history(8);
        assert_eq!(window.len(), 8);
        assert_eq!(window[0].content, "turn 4");
        assert_eq!(session.recent_history(50).len(), 12);
    }

    #[test]
    fn generated_ids_are_opaque_and_unique() {
        let first = SessionId::generate();
        let second = SessionId::generate();
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 32);
    }
}
