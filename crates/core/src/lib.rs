pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod gateway;
pub mod render;
pub mod time;
pub mod validation;

pub use domain::booking::{
    BusyInterval, CreatedEvent, EmailMessage, EventRequest, SentEmail, ToolResult,
};
pub use domain::session::{Role, Session, SessionId, Turn};
pub use domain::slots::{SlotKey, Slots};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use flows::{BookingFlow, FlowEngine, FlowEvent, FlowState};
pub use gateway::{BusyQuery, CalendarGateway, GatewayError, MailGateway};
pub use validation::{missing_or_invalid, SlotIssue};
