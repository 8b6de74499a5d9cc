//! Agent runtime for booking calendar events through conversation.
//!
//! Each session collects event slots over several turns. A turn runs in this
//! order:
//! 1. **Local replies** (`runtime`) - yes/no to a pending summary and
//!    availability questions are answered without the model.
//! 2. **Heuristics** (`conversation`) - emails, links and timezone hints are
//!    folded into the slots.
//! 3. **Policy step** (`policy`) - the model picks one action, decoded by
//!    `action`, and the result is applied.
//! 4. **Tools** (`tools`) - calendar and mail calls, gated by `guardrails`.
//!
//! The model never creates an event on its own. Creation requires a pending
//! confirmation that the user answered affirmatively.

pub mod action;
pub mod booking;
pub mod conversation;
pub mod guardrails;
pub mod llm;
pub mod policy;
pub mod prompt;
pub mod runtime;
pub mod session;
pub mod tools;

pub use llm::LlmClient;
pub use runtime::{
    AgentDependencies, AgentRuntime, RuntimeSettings, StartedSession, TurnData, TurnResponse,
};
pub use session::{InMemorySessionStore, SessionStore};
