use std::sync::OnceLock;

use agenda_core::domain::slots::Slots;
use regex::Regex;

const TIMEZONE_WORDS: [(&str, &str); 4] = [
    ("pacific", "America/Los_Angeles"),
    ("mountain", "America/Denver"),
    ("central", "America/Chicago"),
    ("eastern", "America/New_York"),
];

fn affirmative_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(yes|yep|yeah|sure|confirm|go ahead|proceed|looks good|create it|do it)\b")
            .expect("affirmative pattern compiles")
    })
}

fn negative_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(no|nah|stop|cancel|don'?t|hold|wait)\b")
            .expect("negative pattern compiles")
    })
}

fn skip_email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(don'?t|do not|no|skip)\s+email\b").expect("skip-email pattern compiles")
    })
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").expect("email pattern compiles"))
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+").expect("url pattern compiles"))
}

fn timezone_abbreviation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(PDT|PST|PT|MDT|MST|MT|CDT|CST|CT|EDT|EST|ET)\b")
            .expect("timezone abbreviation pattern compiles")
    })
}

fn availability_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(check|verify|see)\b.*\b(avail|availability|free|busy)\b|\bam i (free|busy)\b")
            .expect("availability pattern compiles")
    })
}

fn title_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bwith\s+([A-Z][a-zA-Z]+)\b").expect("title pattern compiles"))
}

pub fn detect_affirmative(text: &str) -> bool {
    affirmative_re().is_match(text)
}

pub fn detect_negative(text: &str) -> bool {
    negative_re().is_match(text)
}

pub fn detect_skip_email(text: &str) -> bool {
    skip_email_re().is_match(text)
}

/// Email-shaped tokens in first-seen order, deduplicated ignoring case.
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut emails: Vec<String> = Vec::new();
    for found in email_re().find_iter(text) {
        let email = found.as_str();
        if !emails.iter().any(|known| known.eq_ignore_ascii_case(email)) {
            emails.push(email.to_string());
        }
    }
    emails
}

pub fn extract_first_link(text: &str) -> Option<String> {
    url_re().find(text).map(|found| found.as_str().to_string())
}

/// Word forms are checked first in fixed order; among abbreviations the last
/// occurrence wins.
pub fn detect_timezone_hint(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    if let Some((_, zone)) = TIMEZONE_WORDS.iter().find(|(word, _)| lowered.contains(*word)) {
        return Some(*zone);
    }

    let last = timezone_abbreviation_re().find_iter(text).last()?;
    match last.as_str().to_ascii_uppercase().as_str() {
        "PDT" | "PST" | "PT" => Some("America/Los_Angeles"),
        "MDT" | "MST" | "MT" => Some("America/Denver"),
        "CDT" | "CST" | "CT" => Some("America/Chicago"),
        "EDT" | "EST" | "ET" => Some("America/New_York"),
        _ => None,
    }
}

pub fn wants_availability_check(text: &str) -> bool {
    availability_re().is_match(&text.to_lowercase())
}

/// Cheap title guess used when the completion output cannot be decoded.
pub fn cheap_title(text: &str) -> String {
    title_name_re()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|name| format!("Meeting with {}", name.as_str()))
        .unwrap_or_else(|| "Meeting".to_string())
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageSignals {
    pub emails: Vec<String>,
    pub link: Option<String>,
    pub timezone_hint: Option<&'static str>,
    pub affirmative: bool,
    pub negative: bool,
    pub skip_email: bool,
    pub availability_request: bool,
}

impl MessageSignals {
    /// Folds the extracted values into `slots`. Re-applying the same signals
    /// leaves the slots unchanged.
    pub fn apply_to(&self, slots: &mut Slots) {
        for email in &self.emails {
            slots.add_attendee(email);
        }
        let has_link = slots.link.as_deref().is_some_and(|link| !link.trim().is_empty());
        if !has_link {
            if let Some(link) = &self.link {
                slots.link = Some(link.clone());
            }
        }
        if let Some(zone) = self.timezone_hint {
            slots.timezone = Some(zone.to_string());
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SignalExtractor;

impl SignalExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str) -> MessageSignals {
        MessageSignals {
            emails: extract_emails(text),
            link: extract_first_link(text),
            timezone_hint: detect_timezone_hint(text),
            affirmative: detect_affirmative(text),
            negative: detect_negative(text),
            skip_email: detect_skip_email(text),
            availability_request: wants_availability_check(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use agenda_core::domain::slots::Slots;

    use super::{
        cheap_title, detect_affirmative, detect_negative, detect_skip_email,
        detect_timezone_hint, extract_emails, extract_first_link, wants_availability_check,
        SignalExtractor,
    };

    #[test]
    fn yes_and_no_vocabulary() {
        struct Case {
            text: &'static str,
            yes: bool,
            no: bool,
        }

        let cases = [
            Case { text: "yes", yes: true, no: false },
            Case { text: "Yep, looks good", yes: true, no: false },
            Case { text: "go ahead and create it", yes: true, no: false },
            Case { text: "PROCEED", yes: true, no: false },
            Case { text: "nah", yes: false, no: true },
            Case { text: "wait, change the time", yes: false, no: true },
            Case { text: "don't do that", yes: false, no: true },
            Case { text: "Cancel", yes: false, no: true },
            Case { text: "yesterday was busy", yes: false, no: false },
            Case { text: "nothing to add", yes: false, no: false },
        ];

        for (index, case) in cases.iter().enumerate() {
            assert_eq!(detect_affirmative(case.text), case.yes, "case {index}: {}", case.text);
            assert_eq!(detect_negative(case.text), case.no, "case {index}: {}", case.text);
        }
    }

    #[test]
    fn skip_email_needs_negation_right_before_email() {
        assert!(detect_skip_email("yes, no email please"));
        assert!(detect_skip_email("Don't email them"));
        assert!(detect_skip_email("do not  email anyone"));
        assert!(detect_skip_email("skip email"));
        assert!(!detect_skip_email("email them, no rush"));
        assert!(!detect_skip_email("no need to email"));
    }

    #[test]
    fn emails_are_ordered_and_unique() {
        let emails =
            extract_emails("add bob@example.com and Ada.L@lab.example.org, also BOB@example.com.");
        assert_eq!(emails, vec!["bob@example.com", "Ada.L@lab.example.org"]);
    }

    #[test]
    fn first_link_only() {
        assert_eq!(
            extract_first_link("join https://meet.example.com/abc or http://backup.example.com"),
            Some("https://meet.example.com/abc".to_string())
        );
        assert_eq!(extract_first_link("no link here"), None);
    }

    #[test]
    fn timezone_word_beats_abbreviation() {
        assert_eq!(detect_timezone_hint("3pm ET, which is noon pacific"), Some("America/Los_Angeles"));
        assert_eq!(detect_timezone_hint("Central time please"), Some("America/Chicago"));
    }

    #[test]
    fn last_timezone_abbreviation_wins() {
        assert_eq!(detect_timezone_hint("10am PT, sorry, 10am EST"), Some("America/New_York"));
        assert_eq!(detect_timezone_hint("at 4 mdt"), Some("America/Denver"));
        assert_eq!(detect_timezone_hint("tomorrow at 10"), None);
    }

    #[test]
    fn availability_phrasing() {
        assert!(wants_availability_check("am I free tomorrow 2-3pm?"));
        assert!(wants_availability_check("Can you check my availability Friday"));
        assert!(wants_availability_check("see if I'm busy at noon"));
        assert!(!wants_availability_check("schedule a meeting at 3"));
        assert!(!wants_availability_check("free lunch with Ada"));
    }

    #[test]
    fn cheap_title_uses_capitalized_name() {
        assert_eq!(cheap_title("schedule meeting with Ada tomorrow"), "Meeting with Ada");
        assert_eq!(cheap_title("lunch with the team"), "Meeting");
        assert_eq!(cheap_title(""), "Meeting");
    }

    #[test]
    fn applying_signals_twice_is_idempotent() {
        let extractor = SignalExtractor::new();
        let text = "invite a@example.com, A@example.com and b@example.com https://meet.example.com/x PT";
        let signals = extractor.extract(text);

        let mut slots = Slots::default();
        signals.apply_to(&mut slots);
        let once = slots.clone();
        signals.apply_to(&mut slots);

        assert_eq!(slots, once);
        assert_eq!(slots.attendees, vec!["a@example.com", "b@example.com"]);
        assert_eq!(slots.timezone.as_deref(), Some("America/Los_Angeles"));
    }

    #[test]
    fn existing_link_is_not_overwritten() {
        let mut slots =
            Slots { link: Some("https://mine.example.com".to_string()), ..Slots::default() };
        SignalExtractor::new().extract("use https://other.example.com").apply_to(&mut slots);
        assert_eq!(slots.link.as_deref(), Some("https://mine.example.com"));
    }
}
