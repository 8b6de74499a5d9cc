use agenda_core::domain::slots::{SlotKey, Slots};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("completion output contains no JSON object")]
    NoJsonObject,
    #[error("completion output is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("completion output is not a JSON object")]
    NotAnObject,
    #[error("completion output has no `action`")]
    MissingAction,
}

/// Slot values requested by a `set` decision, in the order they appeared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotPatch {
    pub values: Vec<(SlotKey, String)>,
    pub attendees: Option<Vec<String>>,
}

impl SlotPatch {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.attendees.is_none()
    }

    pub fn apply(&self, slots: &mut Slots) {
        for (key, value) in &self.values {
            slots.set_text(*key, value.clone());
        }
        if let Some(attendees) = &self.attendees {
            slots.set_attendees(attendees.iter().cloned());
        }
    }

    fn from_args(args: &Map<String, Value>) -> Self {
        let mut patch = Self::default();
        for (name, value) in args {
            let Some(key) = SlotKey::from_name(name) else {
                continue;
            };
            if key == SlotKey::Attendees {
                let attendees = attendee_values(value);
                if !attendees.is_empty() {
                    patch.attendees = Some(attendees);
                }
                continue;
            }
            if let Some(text) = scalar_text(value) {
                patch.values.push((key, text));
            }
        }
        patch
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionDecision {
    Ask { question: Option<String> },
    Set(SlotPatch),
    Confirm { summary: Option<String> },
    CheckAvailability,
    CreateEvent,
    SendEmail { yes: bool },
    Finish { message: Option<String> },
    Unrecognized(String),
}

impl ActionDecision {
    /// Decodes the text between the first `{` and the last `}` of `raw`.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let start = raw.find('{').ok_or(ProtocolError::NoJsonObject)?;
        let end = raw.rfind('}').ok_or(ProtocolError::NoJsonObject)?;
        if end < start {
            return Err(ProtocolError::NoJsonObject);
        }

        let value: Value = serde_json::from_str(&raw[start..=end])
            .map_err(|error| ProtocolError::InvalidJson(error.to_string()))?;
        let object = value.as_object().ok_or(ProtocolError::NotAnObject)?;
        let action = object
            .get("action")
            .and_then(Value::as_str)
            .map(|action| action.trim().to_ascii_lowercase())
            .filter(|action| !action.is_empty())
            .ok_or(ProtocolError::MissingAction)?;

        let empty = Map::new();
        let args = object.get("args").and_then(Value::as_object).unwrap_or(&empty);

        Ok(match action.as_str() {
            "ask" => Self::Ask { question: text_arg(args, "question") },
            "set" => Self::Set(SlotPatch::from_args(args)),
            "confirm" => Self::Confirm { summary: text_arg(args, "summary") },
            "check_availability" => Self::CheckAvailability,
            "create_event" => Self::CreateEvent,
            "send_email" => Self::SendEmail { yes: bool_arg(args, "yes").unwrap_or(true) },
            "finish" => Self::Finish { message: text_arg(args, "message") },
            _ => Self::Unrecognized(action),
        })
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Ask { .. } => "ask",
            Self::Set(_) => "set",
            Self::Confirm { .. } => "confirm",
            Self::CheckAvailability => "check_availability",
            Self::CreateEvent => "create_event",
            Self::SendEmail { .. } => "send_email",
            Self::Finish { .. } => "finish",
            Self::Unrecognized(tag) => tag,
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn attendee_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(text) => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn text_arg(args: &Map<String, Value>, name: &str) -> Option<String> {
    args.get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn bool_arg(args: &Map<String, Value>, name: &str) -> Option<bool> {
    match args.get(name)? {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use agenda_core::domain::slots::{SlotKey, Slots};

    use super::{ActionDecision, ProtocolError, SlotPatch};

    #[test]
    fn decodes_object_wrapped_in_prose() {
        let raw = "Sure! Here you go:\n{\"action\": \"ask\", \"args\": {\"question\": \"When?\"}}\nThanks";
        assert_eq!(
            ActionDecision::parse(raw),
            Ok(ActionDecision::Ask { question: Some("When?".to_string()) })
        );
    }

    #[test]
    fn protocol_failures_are_classified() {
        assert_eq!(ActionDecision::parse("no json at all"), Err(ProtocolError::NoJsonObject));
        assert_eq!(ActionDecision::parse("} backwards {"), Err(ProtocolError::NoJsonObject));
        assert!(matches!(ActionDecision::parse("{not json}"), Err(ProtocolError::InvalidJson(_))));
        assert_eq!(
            ActionDecision::parse("{\"args\": {}}"),
            Err(ProtocolError::MissingAction)
        );
        assert_eq!(ActionDecision::parse("{\"action\": \"  \"}"), Err(ProtocolError::MissingAction));
    }

    #[test]
    fn unknown_tags_are_kept_as_unrecognized() {
        assert_eq!(
            ActionDecision::parse("{\"action\": \"Reschedule\"}"),
            Ok(ActionDecision::Unrecognized("reschedule".to_string()))
        );
    }

    #[test]
    fn send_email_defaults_to_yes() {
        assert_eq!(
            ActionDecision::parse("{\"action\": \"send_email\"}"),
            Ok(ActionDecision::SendEmail { yes: true })
        );
        assert_eq!(
            ActionDecision::parse("{\"action\": \"send_email\", \"args\": {\"yes\": false}}"),
            Ok(ActionDecision::SendEmail { yes: false })
        );
    }

    #[test]
    fn set_keeps_only_known_non_empty_slots() {
        let raw = r#"{"action": "set", "args": {
            "title": "Design review",
            "start_iso": "2025-08-18T10:00:00",
            "end_iso": "",
            "organizer": "me",
            "attendees": ["a@example.com", "", "b@example.com"],
            "location": null
        }}"#;

        let decision = ActionDecision::parse(raw).expect("decodes");
        let ActionDecision::Set(patch) = decision else {
            panic!("expected set decision");
        };

        let keys = patch.values.iter().map(|(key, _)| *key).collect::<Vec<_>>();
        assert!(keys.contains(&SlotKey::Title));
        assert!(keys.contains(&SlotKey::StartIso));
        assert!(!keys.contains(&SlotKey::EndIso));
        assert!(!keys.contains(&SlotKey::Location));
        assert_eq!(
            patch.attendees,
            Some(vec!["a@example.com".to_string(), "b@example.com".to_string()])
        );
    }

    #[test]
    fn empty_attendee_list_does_not_clear_slot() {
        let mut slots = Slots::default();
        slots.add_attendee("keep@example.com");
        let decision =
            ActionDecision::parse(r#"{"action":"set","args":{"attendees":[]}}"#).expect("decodes");
        let ActionDecision::Set(patch) = decision else {
            panic!("expected set");
        };
        assert!(patch.is_empty());
        patch.apply(&mut slots);
        assert_eq!(slots.attendees, vec!["keep@example.com"]);
    }

    #[test]
    fn patch_overwrites_existing_values() {
        let mut slots = Slots { title: Some("Old".to_string()), ..Slots::default() };
        let patch = SlotPatch {
            values: vec![(SlotKey::Title, "New".to_string())],
            attendees: Some(vec!["x@example.com".to_string()]),
        };
        patch.apply(&mut slots);
        assert_eq!(slots.title.as_deref(), Some("New"));
        assert_eq!(slots.attendees, vec!["x@example.com"]);
    }
}
