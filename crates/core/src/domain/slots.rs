use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKey {
    Title,
    StartIso,
    EndIso,
    Timezone,
    Attendees,
    Location,
    Description,
    Recurrence,
    Link,
}

impl SlotKey {
    pub const ALL: [SlotKey; 9] = [
        SlotKey::Title,
        SlotKey::StartIso,
        SlotKey::EndIso,
        SlotKey::Timezone,
        SlotKey::Attendees,
        SlotKey::Location,
        SlotKey::Description,
        SlotKey::Recurrence,
        SlotKey::Link,
    ];

    /// Fields that must be filled before an event can be created.
    pub const REQUIRED: [SlotKey; 4] =
        [SlotKey::Title, SlotKey::StartIso, SlotKey::EndIso, SlotKey::Timezone];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::StartIso => "start_iso",
            Self::EndIso => "end_iso",
            Self::Timezone => "timezone",
            Self::Attendees => "attendees",
            Self::Location => "location",
            Self::Description => "description",
            Self::Recurrence => "recurrence",
            Self::Link => "link",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

/// Scheduling fields accumulated across turns. Serializes with explicit nulls
/// for unknown values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slots {
    pub title: Option<String>,
    pub start_iso: Option<String>,
    pub end_iso: Option<String>,
    pub timezone: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub recurrence: Option<String>,
    pub link: Option<String>,
}

impl Slots {
    pub fn text(&self, key: SlotKey) -> Option<&str> {
        let value = match key {
            SlotKey::Title => &self.title,
            SlotKey::StartIso => &self.start_iso,
            SlotKey::EndIso => &self.end_iso,
            SlotKey::Timezone => &self.timezone,
            SlotKey::Location => &self.location,
            SlotKey::Description => &self.description,
            SlotKey::Recurrence => &self.recurrence,
            SlotKey::Link => &self.link,
            SlotKey::Attendees => return None,
        };
        value.as_deref().filter(|value| !value.trim().is_empty())
    }

    pub fn is_filled(&self, key: SlotKey) -> bool {
        match key {
            SlotKey::Attendees => !self.attendees.is_empty(),
            other => self.text(other).is_some(),
        }
    }

    /// Overwrites a scalar slot. Attendees are split on commas and replace
    /// the current list.
    pub fn set_text(&mut self, key: SlotKey, value: impl Into<String>) {
        let value = value.into();
        let target = match key {
            SlotKey::Title => &mut self.title,
            SlotKey::StartIso => &mut self.start_iso,
            SlotKey::EndIso => &mut self.end_iso,
            SlotKey::Timezone => &mut self.timezone,
            SlotKey::Location => &mut self.location,
            SlotKey::Description => &mut self.description,
            SlotKey::Recurrence => &mut self.recurrence,
            SlotKey::Link => &mut self.link,
            SlotKey::Attendees => {
                self.set_attendees(value.split(',').map(str::to_string));
                return;
            }
        };
        *target = Some(value.trim().to_string());
    }

    pub fn set_attendees<I>(&mut self, attendees: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.attendees.clear();
        for attendee in attendees {
            self.add_attendee(&attendee);
        }
    }

    /// Appends unless an entry with the same address (ignoring case) exists.
    pub fn add_attendee(&mut self, email: &str) -> bool {
        let email = email.trim();
        if email.is_empty() || self.attendees.iter().any(|known| known.eq_ignore_ascii_case(email))
        {
            return false;
        }
        self.attendees.push(email.to_string());
        true
    }

    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
