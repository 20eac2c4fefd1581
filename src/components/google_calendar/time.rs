use super::models::{CalendarEvent, EventDateTime, EventOrigin, GoogleEvent};
use crate::error::{google_calendar_error, AppResult};
use crate::utils::time::start_of_day;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Resolve an event boundary to a UTC instant.
///
/// All-day boundaries (`date`) are midnight in the calendar timezone.
pub(crate) fn parse_event_boundary(boundary: &EventDateTime, tz: &Tz) -> AppResult<DateTime<Utc>> {
    if let Some(date_time) = &boundary.date_time {
        let dt = DateTime::parse_from_rfc3339(date_time)
            .map_err(|e| google_calendar_error(&format!("Failed to parse datetime: {}", e)))?;
        Ok(dt.with_timezone(&Utc))
    } else if let Some(date) = &boundary.date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| google_calendar_error(&format!("Failed to parse date: {}", e)))?;
        start_of_day(date, tz).ok_or_else(|| google_calendar_error("Invalid local date"))
    } else {
        Err(google_calendar_error("Event boundary has neither dateTime nor date"))
    }
}

/// Convert a raw API event, skipping cancelled and malformed entries
pub(crate) fn to_calendar_event(raw: GoogleEvent, tz: &Tz) -> Option<CalendarEvent> {
    if raw.status.as_deref() == Some("cancelled") {
        return None;
    }
    let start = parse_event_boundary(raw.start.as_ref()?, tz).ok()?;
    let end = parse_event_boundary(raw.end.as_ref()?, tz).ok()?;

    Some(CalendarEvent {
        id: raw.id,
        title: raw.summary.unwrap_or_else(|| "(no title)".to_string()),
        description: raw.description,
        location: raw.location,
        start,
        end,
        attendees: raw.attendees.into_iter().filter_map(|a| a.email).collect(),
        source: EventOrigin::Google,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timed_boundary() {
        let boundary = EventDateTime {
            date_time: Some("2024-06-03T10:00:00+03:00".to_string()),
            ..Default::default()
        };
        let parsed = parse_event_boundary(&boundary, &chrono_tz::UTC).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 3, 7, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_all_day_boundary_uses_calendar_timezone() {
        let boundary = EventDateTime {
            date: Some("2024-06-03".to_string()),
            ..Default::default()
        };
        let parsed = parse_event_boundary(&boundary, &chrono_tz::Europe::Helsinki).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 2, 21, 0, 0).unwrap());
    }

    #[test]
    fn test_all_day_boundary_on_midnight_dst_gap() {
        let boundary = EventDateTime {
            date: Some("2024-09-08".to_string()),
            ..Default::default()
        };
        let parsed = parse_event_boundary(&boundary, &chrono_tz::America::Santiago).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 9, 8, 4, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_empty_boundary_fails() {
        assert!(parse_event_boundary(&EventDateTime::default(), &chrono_tz::UTC).is_err());
    }

    #[test]
    fn test_to_calendar_event() {
        let raw: GoogleEvent = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "summary": "Standup",
            "start": { "dateTime": "2024-06-03T09:00:00Z" },
            "end": { "dateTime": "2024-06-03T09:15:00Z" },
            "attendees": [{ "email": "a@example.com" }, { "displayName": "no email" }]
        }))
        .unwrap();

        let event = to_calendar_event(raw, &chrono_tz::UTC).unwrap();
        assert_eq!(event.id, "abc");
        assert_eq!(event.title, "Standup");
        assert_eq!(event.attendees, vec!["a@example.com".to_string()]);
        assert_eq!((event.end - event.start).num_minutes(), 15);
    }

    #[test]
    fn test_cancelled_and_incomplete_events_are_skipped() {
        let cancelled: GoogleEvent = serde_json::from_value(serde_json::json!({
            "id": "gone",
            "status": "cancelled",
            "start": { "dateTime": "2024-06-03T09:00:00Z" },
            "end": { "dateTime": "2024-06-03T10:00:00Z" }
        }))
        .unwrap();
        assert!(to_calendar_event(cancelled, &chrono_tz::UTC).is_none());

        let no_end: GoogleEvent = serde_json::from_value(serde_json::json!({
            "id": "half",
            "start": { "dateTime": "2024-06-03T09:00:00Z" }
        }))
        .unwrap();
        assert!(to_calendar_event(no_end, &chrono_tz::UTC).is_none());
    }
}
