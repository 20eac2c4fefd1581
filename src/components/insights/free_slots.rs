//! Free/busy computation over a daily working window.
//!
//! A cursor walks the events in start order; every gap between the cursor
//! and the next event start that is long enough becomes a free slot.

use super::models::{DayAvailability, TimeSlot};
use crate::components::google_calendar::CalendarEvent;
use crate::config::SchedulingConfig;
use crate::error::AppResult;
use crate::utils::time::working_window;
use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Default minimum length of a reported free slot
pub const DEFAULT_MIN_SLOT_MINUTES: i64 = 30;

/// Computes busy and free slots for a working window
#[derive(Debug, Clone)]
pub struct FreeSlotCalculator {
    min_slot_minutes: i64,
}

impl FreeSlotCalculator {
    pub fn new() -> Self {
        Self {
            min_slot_minutes: DEFAULT_MIN_SLOT_MINUTES,
        }
    }

    /// Set the minimum free slot duration
    pub fn with_min_slot(mut self, minutes: i64) -> Self {
        self.min_slot_minutes = minutes.max(0);
        self
    }

    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self::new().with_min_slot(config.min_free_slot_minutes)
    }

    /// Busy and free slots inside `window_start..window_end`.
    ///
    /// Busy slots are the event spans clipped to the window. Events may
    /// overlap each other and need not be sorted.
    pub fn calculate(
        &self,
        events: &[CalendarEvent],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> DayAvailability {
        let mut availability = DayAvailability::default();
        if window_end <= window_start {
            return availability;
        }

        let mut relevant: Vec<&CalendarEvent> = events
            .iter()
            .filter(|e| e.end > e.start && e.overlaps(window_start, window_end))
            .collect();
        relevant.sort_by_key(|e| e.start);

        let mut cursor = window_start;
        for event in relevant {
            availability.busy.push(TimeSlot::new(
                event.start.max(window_start),
                event.end.min(window_end),
            ));

            if cursor < event.start {
                self.push_free(&mut availability.free, cursor, event.start.min(window_end));
            }
            cursor = cursor.max(event.end);
        }

        if cursor < window_end {
            self.push_free(&mut availability.free, cursor, window_end);
        }

        debug!(
            "{} busy and {} free slots between {} and {}",
            availability.busy.len(),
            availability.free.len(),
            window_start,
            window_end
        );
        availability
    }

    /// Availability for a local date with a window given as HH:MM bounds
    pub fn calculate_day(
        &self,
        events: &[CalendarEvent],
        date: NaiveDate,
        day_start: &str,
        day_end: &str,
        tz: &Tz,
    ) -> AppResult<DayAvailability> {
        let (window_start, window_end) = working_window(date, day_start, day_end, tz)?;
        Ok(self.calculate(events, window_start, window_end))
    }

    /// Availability for `days` consecutive days starting at `first_day`,
    /// stopping early at the end of the representable calendar
    pub fn look_ahead(
        &self,
        events: &[CalendarEvent],
        first_day: NaiveDate,
        days: u32,
        day_start: &str,
        day_end: &str,
        tz: &Tz,
    ) -> AppResult<Vec<(NaiveDate, DayAvailability)>> {
        (0..days)
            .map_while(|offset| first_day.checked_add_days(Days::new(u64::from(offset))))
            .map(|date| {
                self.calculate_day(events, date, day_start, day_end, tz)
                    .map(|availability| (date, availability))
            })
            .collect()
    }

    fn push_free(&self, free: &mut Vec<TimeSlot>, start: DateTime<Utc>, end: DateTime<Utc>) {
        let slot = TimeSlot::new(start, end);
        if !slot.is_empty() && slot.duration_minutes >= self.min_slot_minutes {
            free.push(slot);
        }
    }
}

impl Default for FreeSlotCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, hour, minute, 0).unwrap()
    }

    fn event(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent::new(id, id, start, end)
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (at(9, 0), at(18, 0))
    }

    #[test]
    fn test_empty_calendar_is_one_free_slot() {
        let (start, end) = window();
        let result = FreeSlotCalculator::new().calculate(&[], start, end);

        assert!(result.busy.is_empty());
        assert_eq!(result.free, vec![TimeSlot::new(start, end)]);
        assert_eq!(result.free[0].duration_minutes, 540);
    }

    #[test]
    fn test_single_meeting_splits_the_day() {
        let (start, end) = window();
        let events = vec![event("standup", at(10, 0), at(11, 0))];
        let result = FreeSlotCalculator::new().calculate(&events, start, end);

        assert_eq!(result.busy, vec![TimeSlot::new(at(10, 0), at(11, 0))]);
        assert_eq!(result.free.len(), 2);
        assert_eq!(result.free[0], TimeSlot::new(at(9, 0), at(10, 0)));
        assert_eq!(result.free[0].duration_minutes, 60);
        assert_eq!(result.free[1], TimeSlot::new(at(11, 0), at(18, 0)));
        assert_eq!(result.free[1].duration_minutes, 420);
    }

    #[test]
    fn test_minimum_slot_boundary() {
        let (start, end) = window();

        // 09:00-09:29 is too short
        let events = vec![event("a", at(9, 29), at(18, 0))];
        let result = FreeSlotCalculator::new().calculate(&events, start, end);
        assert!(result.free.is_empty());

        // 09:00-09:30 is just long enough
        let events = vec![event("a", at(9, 30), at(18, 0))];
        let result = FreeSlotCalculator::new().calculate(&events, start, end);
        assert_eq!(result.free, vec![TimeSlot::new(at(9, 0), at(9, 30))]);
    }

    #[test]
    fn test_fully_booked_day() {
        let (start, end) = window();
        let events = vec![event("offsite", at(8, 0), at(19, 0))];
        let result = FreeSlotCalculator::new().calculate(&events, start, end);

        assert!(result.free.is_empty());
        assert_eq!(result.busy, vec![TimeSlot::new(start, end)]);
    }

    #[test]
    fn test_overlapping_events_use_latest_end() {
        let (start, end) = window();
        let events = vec![
            event("long", at(10, 0), at(12, 0)),
            event("inner", at(10, 30), at(11, 0)),
            event("late", at(13, 0), at(14, 0)),
        ];
        let result = FreeSlotCalculator::new().calculate(&events, start, end);

        assert_eq!(
            result.free,
            vec![
                TimeSlot::new(at(9, 0), at(10, 0)),
                TimeSlot::new(at(12, 0), at(13, 0)),
                TimeSlot::new(at(14, 0), at(18, 0)),
            ]
        );
        assert_eq!(result.busy.len(), 3);
    }

    #[test]
    fn test_unsorted_and_out_of_window_events() {
        let (start, end) = window();
        let events = vec![
            event("evening", at(19, 0), at(20, 0)),
            event("lunch", at(12, 0), at(13, 0)),
            event("early", at(7, 0), at(8, 0)),
            event("broken", at(15, 0), at(14, 0)),
        ];
        let result = FreeSlotCalculator::new().calculate(&events, start, end);

        assert_eq!(result.busy, vec![TimeSlot::new(at(12, 0), at(13, 0))]);
        assert_eq!(
            result.free,
            vec![
                TimeSlot::new(at(9, 0), at(12, 0)),
                TimeSlot::new(at(13, 0), at(18, 0)),
            ]
        );
    }

    #[test]
    fn test_free_and_busy_tile_the_window() {
        let (start, end) = window();
        let events = vec![
            event("a", at(9, 45), at(10, 30)),
            event("b", at(11, 0), at(11, 45)),
            event("c", at(13, 0), at(15, 0)),
            event("d", at(16, 30), at(17, 15)),
        ];
        let result = FreeSlotCalculator::new().with_min_slot(0).calculate(&events, start, end);

        let mut all: Vec<TimeSlot> = result.busy.iter().chain(result.free.iter()).copied().collect();
        all.sort_by_key(|s| s.start);

        assert_eq!(all.first().unwrap().start, start);
        assert_eq!(all.last().unwrap().end, end);
        for pair in all.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap or overlap at {}", pair[0].end);
        }
        let total: i64 = all.iter().map(|s| s.duration_minutes).sum();
        assert_eq!(total, 540);
    }

    #[test]
    fn test_configured_minimum() {
        let (start, end) = window();
        let events = vec![event("a", at(9, 15), at(18, 0))];

        let default = FreeSlotCalculator::new().calculate(&events, start, end);
        assert!(default.free.is_empty());

        let config = SchedulingConfig {
            min_free_slot_minutes: 15,
            ..Default::default()
        };
        let relaxed = FreeSlotCalculator::from_config(&config).calculate(&events, start, end);
        assert_eq!(relaxed.free.len(), 1);
    }

    #[test]
    fn test_look_ahead_covers_each_day() {
        let first = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let events = vec![event("standup", at(10, 0), at(11, 0))];
        let days = FreeSlotCalculator::new()
            .look_ahead(&events, first, 3, "09:00", "18:00", &chrono_tz::UTC)
            .unwrap();

        assert_eq!(days.len(), 3);
        assert_eq!(days[0].1.free.len(), 2);
        assert_eq!(days[1].0, NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
        assert_eq!(days[1].1.total_free_minutes(), 540);
        assert_eq!(days[2].1.total_free_minutes(), 540);
    }

    #[test]
    fn test_look_ahead_stops_at_calendar_end() {
        let last = NaiveDate::MAX.pred_opt().unwrap();
        let days = FreeSlotCalculator::new()
            .look_ahead(&[], last, u32::MAX, "09:00", "18:00", &chrono_tz::UTC)
            .unwrap();

        assert_eq!(days.len(), 2);
        assert_eq!(days[1].0, NaiveDate::MAX);
    }
}
