use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventOrigin {
    #[default]
    Google,
    Internal,
}

/// Calendar event as used by the scheduling logic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<String>,
    pub source: EventOrigin,
}

impl CalendarEvent {
    /// Event with only the fields the slot arithmetic needs
    pub fn new(id: &str, title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            location: None,
            start,
            end,
            attendees: Vec::new(),
            source: EventOrigin::Google,
        }
    }

    /// Half-open overlap: touching boundaries do not overlap
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

/// Event to be created in the calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<String>,
    /// IANA timezone name sent alongside the instants
    pub timezone: String,
}

impl NewEvent {
    /// Local copy of the event before any provider has assigned it an id
    pub fn to_internal_event(&self) -> CalendarEvent {
        CalendarEvent {
            id: uuid::Uuid::new_v4().to_string(),
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            start: self.start,
            end: self.end,
            attendees: self.attendees.clone(),
            source: EventOrigin::Internal,
        }
    }
}

/// Raw `events.list` response page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventListResponse {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
    pub next_page_token: Option<String>,
}

/// Raw event resource, only the fields we read
#[derive(Debug, Deserialize)]
pub(crate) struct GoogleEvent {
    #[serde(default)]
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub start: Option<EventDateTime>,
    pub end: Option<EventDateTime>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

/// Either a timed (`dateTime`) or all-day (`date`) boundary
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Attendee {
    pub email: Option<String>,
}

/// Body of an `events.insert` request
#[derive(Debug, Serialize)]
pub(crate) struct InsertEventBody {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
}

impl From<&NewEvent> for InsertEventBody {
    fn from(event: &NewEvent) -> Self {
        let boundary = |instant: DateTime<Utc>| EventDateTime {
            date_time: Some(instant.to_rfc3339()),
            date: None,
            time_zone: Some(event.timezone.clone()),
        };
        Self {
            summary: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            start: boundary(event.start),
            end: boundary(event.end),
            attendees: event
                .attendees
                .iter()
                .map(|email| Attendee {
                    email: Some(email.clone()),
                })
                .collect(),
        }
    }
}
