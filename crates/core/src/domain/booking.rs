use serde::{Deserialize, Serialize};

use crate::domain::slots::Slots;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    pub title: String,
    pub start_iso: String,
    pub end_iso: String,
    pub timezone: String,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub recurrence: Option<String>,
}

impl EventRequest {
    /// Builds a request from validated slots.
    pub fn from_slots(slots: &Slots, default_timezone: &str) -> Self {
        Self {
            title: slots.title.clone().unwrap_or_default(),
            start_iso: slots.start_iso.clone().unwrap_or_default(),
            end_iso: slots.end_iso.clone().unwrap_or_default(),
            timezone: slots.timezone.clone().unwrap_or_else(|| default_timezone.to_string()),
            attendees: slots.attendees.clone(),
            location: slots.location.clone(),
            description: slots.description.clone(),
            recurrence: slots.recurrence.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
    pub link: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentEmail {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: String,
    pub end: String,
}

/// Result shape every collaborator reports through. Failures never escape as
/// errors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult<T> {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ToolResult<T> {
    pub fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { ok: false, data: None, error: Some(error.into()) }
    }

    pub fn succeeded(&self) -> Option<&T> {
        if self.ok {
            self.data.as_ref()
        } else {
            None
        }
    }
}
