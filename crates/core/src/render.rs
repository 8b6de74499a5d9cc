use crate::domain::booking::EmailMessage;
use crate::domain::slots::{SlotKey, Slots};

pub fn render_confirmation(slots: &Slots, default_timezone: &str) -> String {
    let title = slots.text(SlotKey::Title).unwrap_or("Untitled");
    let start = slots.text(SlotKey::StartIso).unwrap_or("?");
    let end = slots.text(SlotKey::EndIso).unwrap_or("?");
    let timezone = slots.text(SlotKey::Timezone).unwrap_or(default_timezone);
    let attendees =
        if slots.attendees.is_empty() { "none".to_string() } else { slots.attendees.join(", ") };
    let location = slots
        .text(SlotKey::Location)
        .map(|location| format!(", location: {location}"))
        .unwrap_or_default();
    let link = slots.text(SlotKey::Link).map(|link| format!(", link: {link}")).unwrap_or_default();

    format!(
        "Create \u{201c}{title}\u{201d} from {start} to {end} ({timezone}) with attendees [{attendees}]{location}{link}? (yes/no)"
    )
}

/// Invitation addressed to every attendee. `link` wins over the slot link.
pub fn compose_invite(slots: &Slots, link: Option<&str>, default_timezone: &str) -> EmailMessage {
    let title = slots.text(SlotKey::Title).unwrap_or("Untitled");
    let start = slots.text(SlotKey::StartIso).unwrap_or("?");
    let end = slots.text(SlotKey::EndIso).unwrap_or("?");
    let timezone = slots.text(SlotKey::Timezone).unwrap_or(default_timezone);
    let link_line = link
        .filter(|link| !link.trim().is_empty())
        .or_else(|| slots.text(SlotKey::Link))
        .map(|link| format!("Link: {link}"))
        .unwrap_or_default();

    EmailMessage {
        to: slots.attendees.clone(),
        subject: format!("Invite: {title}"),
        body_text: format!(
            "You're invited to '{title}'.\nStart: {start}\nEnd: {end}\nTimezone: {timezone}\n{link_line}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{compose_invite, render_confirmation};
    use crate::domain::slots::Slots;

    #[test]
    fn renders_defaults_for_empty_slots() {
        assert_eq!(
            render_confirmation(&Slots::default(), "America/Chicago"),
            "Create \u{201c}Untitled\u{201d} from ? to ? (America/Chicago) with attendees [none]? (yes/no)"
        );
    }

    #[test]
    fn renders_optional_suffixes_only_when_set() {
        let slots = Slots {
            title: Some("Sync".to_string()),
            start_iso: Some("2025-08-18T10:00:00".to_string()),
            end_iso: Some("2025-08-18T10:30:00".to_string()),
            timezone: Some("America/Chicago".to_string()),
            attendees: vec!["a@example.com".to_string(), "b@example.com".to_string()],
            location: Some("Room 4".to_string()),
            link: Some("https://meet.example.com/x".to_string()),
            ..Slots::default()
        };

        assert_eq!(
            render_confirmation(&slots, "UTC"),
            "Create \u{201c}Sync\u{201d} from 2025-08-18T10:00:00 to 2025-08-18T10:30:00 (America/Chicago) with attendees [a@example.com, b@example.com], location: Room 4, link: https://meet.example.com/x? (yes/no)"
        );
        assert_eq!(render_confirmation(&slots, "UTC"), render_confirmation(&slots, "UTC"));
    }

    #[test]
    fn invite_prefers_event_link() {
        let slots = Slots {
            title: Some("Sync".to_string()),
            start_iso: Some("2025-08-18T10:00:00".to_string()),
            end_iso: Some("2025-08-18T10:30:00".to_string()),
            timezone: Some("America/Chicago".to_string()),
            attendees: vec!["a@example.com".to_string()],
            link: Some("https://user.example.com".to_string()),
            ..Slots::default()
        };

        let message = compose_invite(&slots, Some("https://calendar.example.com/e1"), "UTC");
        assert_eq!(message.subject, "Invite: Sync");
        assert_eq!(message.to, vec!["a@example.com"]);
        assert_eq!(
            message.body_text,
            "You're invited to 'Sync'.\nStart: 2025-08-18T10:00:00\nEnd: 2025-08-18T10:30:00\nTimezone: America/Chicago\nLink: https://calendar.example.com/e1"
        );

        let fallback = compose_invite(&slots, None, "UTC");
        assert!(fallback.body_text.ends_with("Link: https://user.example.com"));
    }

    #[test]
    fn invite_without_link_ends_with_blank_line() {
        let slots = Slots { title: Some("Sync".to_string()), ..Slots::default() };
        let message = compose_invite(&slots, None, "UTC");
        assert!(message.body_text.ends_with("Timezone: UTC\n"));
    }
}
