use super::models::{CandidateSlot, WorkingHours};
use crate::components::google_calendar::{CalendarEvent, EventSource};
use crate::components::insights::TimeSlot;
use crate::utils::time::{is_weekend, local_to_utc, start_of_day};
use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use tracing::{info, warn};

/// Every hour-aligned weekday slot of `duration_minutes` inside working hours.
///
/// A slot is unavailable when it overlaps any event (half-open: an event
/// ending exactly at the slot start does not conflict).
pub fn enumerate_slots(
    from: NaiveDate,
    to: NaiveDate,
    duration_minutes: i64,
    hours: WorkingHours,
    tz: &Tz,
    events: &[CalendarEvent],
) -> Vec<CandidateSlot> {
    let mut slots = Vec::new();
    if duration_minutes <= 0 || from > to {
        return slots;
    }
    let Some(duration) = Duration::try_minutes(duration_minutes) else {
        return slots;
    };

    for date in from.iter_days().take_while(|d| *d <= to) {
        if is_weekend(date) {
            continue;
        }
        let Some(day_end) = local_to_utc(date, hours.end_hour, 0, tz) else {
            continue;
        };

        for hour in hours.start_hour..hours.end_hour {
            let Some(start) = local_to_utc(date, hour, 0, tz) else {
                continue;
            };
            let end = match start.checked_add_signed(duration) {
                Some(end) if end <= day_end => end,
                _ => break,
            };

            let available = !events.iter().any(|e| e.overlaps(start, end));
            slots.push(CandidateSlot {
                slot: TimeSlot::new(start, end),
                available,
            });
        }
    }

    slots
}

/// Fetches events for a date range and enumerates candidate meeting slots
#[derive(Debug, Clone)]
pub struct MeetingSlotFinder {
    hours: WorkingHours,
    timezone: Tz,
}

impl MeetingSlotFinder {
    pub fn new(hours: WorkingHours, timezone: Tz) -> Self {
        Self { hours, timezone }
    }

    pub fn hours(&self) -> WorkingHours {
        self.hours
    }

    /// Candidate slots for `from..=to`; empty if the event fetch fails
    pub async fn find_slots<S: EventSource + ?Sized>(
        &self,
        source: &S,
        from: NaiveDate,
        to: NaiveDate,
        duration_minutes: i64,
    ) -> Vec<CandidateSlot> {
        if from > to {
            return Vec::new();
        }
        let (Some(time_min), Some(time_max)) = (
            start_of_day(from, &self.timezone),
            to.succ_opt().and_then(|next| start_of_day(next, &self.timezone)),
        ) else {
            warn!("Could not resolve meeting search range {} - {}", from, to);
            return Vec::new();
        };

        let events = match source.fetch_events(time_min, time_max).await {
            Ok(events) => events,
            Err(e) => {
                warn!("Could not fetch events for meeting search: {}", e);
                return Vec::new();
            }
        };

        let slots = enumerate_slots(from, to, duration_minutes, self.hours, &self.timezone, &events);
        info!(
            "Found {} candidate slots ({} available) between {} and {}",
            slots.len(),
            slots.iter().filter(|s| s.available).count(),
            from,
            to
        );
        slots
    }
}
