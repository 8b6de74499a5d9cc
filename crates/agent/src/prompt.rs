use agenda_core::domain::session::Turn;
use agenda_core::domain::slots::Slots;
use chrono::NaiveDate;

const POLICY_RULES: &str = r#"You are a calendar-scheduling agent.
Pick exactly ONE action for this turn and answer with a single JSON object and nothing else.

Shape:
{"action": "<ask|set|confirm|check_availability|create_event|send_email|finish>", "args": {}}

Slots you may set: title, start_iso, end_iso, timezone, attendees, location, description, recurrence, link.

Rules:
- Never check availability unless the user explicitly asks for it.
- Never create the event until the user has confirmed it.
- Once the required slots are known, use "confirm" with a short args.summary.
- Prefer a plain neutral title (for example "Meeting with Ada") over asking for one.
- Resolve relative dates such as "tomorrow" and ranges such as "10-10:30" into ISO 8601 with seconds.
- Map timezone tokens (PT, MT, CT, ET, PDT, EST...) or words such as "Pacific time" to IANA names. Without one, keep the current timezone."#;

pub struct PromptContext<'a> {
    pub today: NaiveDate,
    pub default_timezone: &'a str,
    pub slots: &'a Slots,
    pub latest_message: &'a str,
    pub transcript: &'a [Turn],
}

pub fn render_policy_prompt(context: &PromptContext<'_>) -> String {
    let slots = serde_json::to_string(context.slots).unwrap_or_else(|_| "{}".to_string());
    let transcript = context
        .transcript
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str().to_ascii_uppercase(), turn.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{POLICY_RULES}\n\nDEFAULT_TIMEZONE: {default_timezone}\nTODAY: {today}\n\nSLOTS (null means unknown):\n{slots}\n\nLATEST:\n{latest}\n\nTRANSCRIPT:\n{transcript}\n\nASSISTANT:",
        default_timezone = context.default_timezone,
        today = context.today.format("%Y-%m-%d (%A)"),
        latest = context.latest_message,
    )
}

#[cfg(test)]
mod tests {
    use agenda_core::domain::session::{Role, Turn};
    use agenda_core::domain::slots::Slots;
    use chrono::NaiveDate;

    use super::{render_policy_prompt, PromptContext};

    #[test]
    fn prompt_carries_every_section() {
        let slots = Slots { title: Some("Sync".to_string()), ..Slots::default() };
        let transcript = vec![
            Turn { role: Role::User, content: "book a sync".to_string() },
            Turn { role: Role::Assistant, content: "When?".to_string() },
        ];
        let prompt = render_policy_prompt(&PromptContext {
            today: NaiveDate::from_ymd_opt(2025, 8, 17).expect("date"),
            default_timezone: "America/Chicago",
            slots: &slots,
            latest_message: "tomorrow at 10",
            transcript: &transcript,
        });

        assert!(prompt.contains("Never check availability unless the user explicitly asks"));
        assert!(prompt.contains("Never create the event until the user has confirmed it."));
        assert!(prompt.contains("TODAY: 2025-08-17 (Sunday)"));
        assert!(prompt.contains("DEFAULT_TIMEZONE: America/Chicago"));
        assert!(prompt.contains("\"title\":\"Sync\""));
        assert!(prompt.contains("\"start_iso\":null"));
        assert!(prompt.contains("LATEST:\ntomorrow at 10"));
        assert!(prompt.contains("USER: book a sync\nASSISTANT: When?"));
        assert!(prompt.ends_with("ASSISTANT:"));
    }
}
