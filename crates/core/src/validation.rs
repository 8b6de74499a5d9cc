use std::fmt;

use chrono_tz::Tz;

use crate::domain::slots::{SlotKey, Slots};
use crate::time::to_instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotIssue {
    Missing(SlotKey),
    EndNotAfterStart,
}

impl SlotIssue {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Missing(key) => key.as_str(),
            Self::EndNotAfterStart => "end_iso (must be after start_iso)",
        }
    }
}

impl fmt::Display for SlotIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lists what keeps `slots` from being create-ready, in required-field order.
/// An empty result means the event can be created.
pub fn missing_or_invalid(slots: &Slots, default_zone: Tz) -> Vec<SlotIssue> {
    let mut issues = SlotKey::REQUIRED
        .into_iter()
        .filter(|key| !slots.is_filled(*key))
        .map(SlotIssue::Missing)
        .collect::<Vec<_>>();

    let start = slots.text(SlotKey::StartIso).and_then(|raw| to_instant(raw, default_zone));
    let end = slots.text(SlotKey::EndIso).and_then(|raw| to_instant(raw, default_zone));
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            issues.push(SlotIssue::EndNotAfterStart);
        }
    }

    issues
}

pub fn describe(issues: &[SlotIssue]) -> String {
    issues.iter().map(SlotIssue::label).collect::<Vec<_>>().join(", ")
}
