use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::domain::slots::Slots;

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const ZONED_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M:%S%:z"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParsedDateTime {
    Naive(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

impl ParsedDateTime {
    /// Canonical ISO-8601 with second precision. Naive values stay naive.
    pub fn canonical(&self) -> String {
        match self {
            Self::Naive(value) => value.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Self::Zoned(value) => value.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
        }
    }

    pub fn to_utc(&self, zone: Tz) -> Option<DateTime<Utc>> {
        match self {
            Self::Naive(value) => {
                zone.from_local_datetime(value).earliest().map(|local| local.with_timezone(&Utc))
            }
            Self::Zoned(value) => Some(value.with_timezone(&Utc)),
        }
    }
}

pub fn resolve_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

pub fn parse_datetime(raw: &str) -> Option<ParsedDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Some(ParsedDateTime::Zoned(value));
    }
    for format in ZONED_FORMATS {
        if let Ok(value) = DateTime::parse_from_str(raw, format) {
            return Some(ParsedDateTime::Zoned(value));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ParsedDateTime::Naive(value));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(ParsedDateTime::Naive)
}

/// Parses `raw` and resolves it to an instant, reading offset-less values in
/// `default_zone`.
pub fn to_instant(raw: &str, default_zone: Tz) -> Option<DateTime<Utc>> {
    parse_datetime(raw).and_then(|parsed| parsed.to_utc(default_zone))
}

/// Rewrites parseable start/end values to canonical form. Anything that does
/// not parse is left as-is.
pub fn canonicalize_times(slots: &mut Slots) {
    for value in [&mut slots.start_iso, &mut slots.end_iso] {
        if let Some(canonical) = value.as_deref().and_then(parse_datetime).map(|p| p.canonical())
        {
            *value = Some(canonical);
        }
    }
}

pub fn normalize_times(slots: &mut Slots, default_timezone: &str) {
    canonicalize_times(slots);
    let has_timezone = slots.timezone.as_deref().is_some_and(|tz| !tz.trim().is_empty());
    if !has_timezone {
        slots.timezone = Some(default_timezone.to_string());
    }
}
