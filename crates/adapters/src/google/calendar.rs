use std::collections::HashMap;

use agenda_core::config::CalendarConfig;
use agenda_core::domain::booking::{BusyInterval, CreatedEvent, EventRequest, ToolResult};
use agenda_core::gateway::{BusyQuery, CalendarGateway, GatewayError};
use agenda_core::time::{resolve_timezone, to_instant};
use async_trait::async_trait;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{endpoint, GoogleApiError, GoogleClient, RetryPolicy, CALENDAR_API_BASE};

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<EventAttendee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recurrence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventAttendee {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertedEvent {
    id: String,
    #[serde(default)]
    html_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyBody {
    pub time_min: String,
    pub time_max: String,
    pub time_zone: String,
    pub items: Vec<FreeBusyItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeBusyItem {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: HashMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Default, Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<BusyInterval>,
    #[serde(default)]
    errors: Vec<FreeBusyError>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyError {
    #[serde(default)]
    reason: String,
}

/// Calendar metadata, used by connectivity checks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSummary {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

// ============================================================================
// Payload builders
// ============================================================================

pub fn event_body(request: &EventRequest) -> EventBody {
    let non_blank = |value: &Option<String>| {
        value.as_deref().map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
    };

    EventBody {
        summary: request.title.clone(),
        start: EventTime {
            date_time: request.start_iso.clone(),
            time_zone: request.timezone.clone(),
        },
        end: EventTime { date_time: request.end_iso.clone(), time_zone: request.timezone.clone() },
        attendees: request
            .attendees
            .iter()
            .map(|email| EventAttendee { email: email.clone() })
            .collect(),
        location: non_blank(&request.location),
        description: non_blank(&request.description),
        recurrence: non_blank(&request.recurrence).into_iter().collect(),
    }
}

/// freeBusy wants RFC 3339 bounds. Offset-less values are read in the query's
/// timezone; anything unparseable is passed through for the API to reject.
pub fn free_busy_body(query: &BusyQuery, calendar_id: &str) -> FreeBusyBody {
    let zone = resolve_timezone(&query.timezone).unwrap_or(Tz::UTC);
    let bound = |raw: &str| {
        to_instant(raw, zone).map(|instant| instant.to_rfc3339()).unwrap_or_else(|| raw.to_string())
    };

    FreeBusyBody {
        time_min: bound(&query.start_iso),
        time_max: bound(&query.end_iso),
        time_zone: query.timezone.clone(),
        items: vec![FreeBusyItem { id: calendar_id.to_string() }],
    }
}

fn busy_for(
    response: FreeBusyResponse,
    calendar_id: &str,
) -> Result<Vec<BusyInterval>, GoogleApiError> {
    let Some(calendar) = response.calendars.into_iter().find_map(|(id, calendar)| {
        (id == calendar_id || calendar_id == "primary").then_some(calendar)
    }) else {
        return Ok(Vec::new());
    };

    if let Some(error) = calendar.errors.first() {
        return Err(GoogleApiError::Api { status: 200, message: error.reason.clone() });
    }
    Ok(calendar.busy)
}

// ============================================================================
// Adapter
// ============================================================================

pub struct GoogleCalendar {
    client: GoogleClient,
    calendar_id: String,
    send_updates: String,
}

impl GoogleCalendar {
    pub fn new(client: GoogleClient, config: &CalendarConfig) -> Self {
        Self {
            client,
            calendar_id: config.calendar_id.clone(),
            send_updates: config.send_updates.clone(),
        }
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    pub async fn insert_event(&self, request: &EventRequest) -> Result<CreatedEvent, GoogleApiError> {
        let mut url = endpoint(CALENDAR_API_BASE, &["calendars", &self.calendar_id, "events"])?;
        url.query_pairs_mut().append_pair("sendUpdates", &self.send_updates);

        let inserted: InsertedEvent = self
            .client
            .send_json(self.client.post(url).json(&event_body(request)), &RetryPolicy::once())
            .await?;
        Ok(CreatedEvent { id: inserted.id, link: inserted.html_link })
    }

    pub async fn query_busy(&self, query: &BusyQuery) -> Result<Vec<BusyInterval>, GoogleApiError> {
        let url = endpoint(CALENDAR_API_BASE, &["freeBusy"])?;
        let response: FreeBusyResponse = self
            .client
            .send_json(
                self.client.post(url).json(&free_busy_body(query, &self.calendar_id)),
                &RetryPolicy::default(),
            )
            .await?;
        busy_for(response, &self.calendar_id)
    }

    pub async fn calendar_summary(&self) -> Result<CalendarSummary, GoogleApiError> {
        let url =
            endpoint(CALENDAR_API_BASE, &["users", "me", "calendarList", &self.calendar_id])?;
        self.client.send_json(self.client.get(url), &RetryPolicy::default()).await
    }
}

#[async_trait]
impl CalendarGateway for GoogleCalendar {
    async fn create_event(&self, request: &EventRequest) -> ToolResult<CreatedEvent> {
        match self.insert_event(request).await {
            Ok(created) => {
                info!(
                    event_name = "adapters.google.calendar.event_created",
                    event_id = %created.id,
                    calendar_id = %self.calendar_id,
                );
                ToolResult::success(created)
            }
            Err(error) => {
                warn!(
                    event_name = "adapters.google.calendar.create_failed",
                    calendar_id = %self.calendar_id,
                    error = %error,
                );
                ToolResult::failure(error.to_string())
            }
        }
    }

    async fn busy_intervals(&self, query: &BusyQuery) -> Result<Vec<BusyInterval>, GatewayError> {
        self.query_busy(query).await.map_err(GatewayError::from)
    }
}

#[cfg(test)]
mod tests {
    use agenda_core::domain::booking::EventRequest;
    use agenda_core::gateway::BusyQuery;

    use super::{busy_for, event_body, free_busy_body, FreeBusyResponse, InsertedEvent};
    use crate::google::GoogleApiError;

    fn request() -> EventRequest {
        EventRequest {
            title: "Design review".to_string(),
            start_iso: "2025-08-18T10:00:00".to_string(),
            end_iso: "2025-08-18T10:30:00".to_string(),
            timezone: "America/Chicago".to_string(),
            attendees: vec!["ada@example.com".to_string()],
            location: Some("  ".to_string()),
            description: Some("Link: https://meet.example.com/x".to_string()),
            recurrence: Some("RRULE:FREQ=WEEKLY;COUNT=4".to_string()),
        }
    }

    #[test]
    fn event_body_uses_google_field_names() {
        let json = serde_json::to_value(event_body(&request())).expect("serialize");

        assert_eq!(json["summary"], "Design review");
        assert_eq!(json["start"]["dateTime"], "2025-08-18T10:00:00");
        assert_eq!(json["start"]["timeZone"], "America/Chicago");
        assert_eq!(json["attendees"][0]["email"], "ada@example.com");
        assert_eq!(json["recurrence"][0], "RRULE:FREQ=WEEKLY;COUNT=4");
        assert!(json.get("location").is_none());
    }

    #[test]
    fn event_body_omits_empty_lists() {
        let mut bare = request();
        bare.attendees.clear();
        bare.recurrence = None;
        let json = serde_json::to_value(event_body(&bare)).expect("serialize");
        assert!(json.get("attendees").is_none());
        assert!(json.get("recurrence").is_none());
    }

    #[test]
    fn free_busy_bounds_are_rfc3339() {
        let query = BusyQuery {
            start_iso: "2025-08-18T14:00:00".to_string(),
            end_iso: "2025-08-18T15:00:00".to_string(),
            timezone: "America/Chicago".to_string(),
        };
        let json = serde_json::to_value(free_busy_body(&query, "primary")).expect("serialize");

        assert_eq!(json["timeMin"], "2025-08-18T19:00:00+00:00");
        assert_eq!(json["timeMax"], "2025-08-18T20:00:00+00:00");
        assert_eq!(json["timeZone"], "America/Chicago");
        assert_eq!(json["items"][0]["id"], "primary");
    }

    #[test]
    fn busy_intervals_are_read_for_the_calendar() {
        let response: FreeBusyResponse = serde_json::from_str(
            r#"{"kind": "calendar#freeBusy", "calendars": {"me@example.com": {"busy": [
                {"start": "2025-08-18T19:00:00Z", "end": "2025-08-18T19:30:00Z"}
            ]}}}"#,
        )
        .expect("parse");

        let busy = busy_for(response, "primary").expect("busy");
        assert_eq!(busy.len(), 1);
        assert_eq!(busy[0].start, "2025-08-18T19:00:00Z");

        let empty: FreeBusyResponse = serde_json::from_str("{}").expect("parse");
        assert!(busy_for(empty, "primary").expect("busy").is_empty());
    }

    #[test]
    fn calendar_errors_are_surfaced() {
        let response: FreeBusyResponse = serde_json::from_str(
            r#"{"calendars": {"team@example.com": {"errors": [{"domain": "global", "reason": "notFound"}]}}}"#,
        )
        .expect("parse");

        let error = busy_for(response, "team@example.com").expect_err("error");
        assert!(matches!(error, GoogleApiError::Api { message, .. } if message == "notFound"));
    }

    #[test]
    fn inserted_event_reads_html_link() {
        let inserted: InsertedEvent = serde_json::from_str(
            r#"{"id": "evt123", "htmlLink": "https://www.google.com/calendar/event?eid=abc", "status": "confirmed"}"#,
        )
        .expect("parse");
        assert_eq!(inserted.id, "evt123");
        assert_eq!(
            inserted.html_link.as_deref(),
            Some("https://www.google.com/calendar/event?eid=abc")
        );
    }
}
