use super::finder::MeetingSlotFinder;
use super::models::{CandidateSlot, MeetingRequest, RankedSlot, WorkingHours};
use super::ranker::SlotRanker;
use crate::components::google_calendar::{EventSource, NewEvent};
use crate::components::insights::TimeSlot;
use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{error, info};

/// Finds, ranks and books meeting times
pub struct MeetingScheduler<S: EventSource, R: SlotRanker> {
    source: S,
    ranker: R,
    finder: MeetingSlotFinder,
    timezone: Tz,
}

impl<S: EventSource, R: SlotRanker> MeetingScheduler<S, R> {
    pub fn new(source: S, ranker: R, hours: WorkingHours, timezone: Tz) -> Self {
        Self {
            source,
            ranker,
            finder: MeetingSlotFinder::new(hours, timezone),
            timezone,
        }
    }

    /// All candidate slots in `from..=to`, flagged available or not
    pub async fn find_available_slots(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        duration_minutes: i64,
    ) -> Vec<CandidateSlot> {
        self.finder
            .find_slots(&self.source, from, to, duration_minutes)
            .await
    }

    /// Best meeting times for `request` in `from..=to`
    pub async fn suggest_times(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        request: &MeetingRequest,
    ) -> Vec<RankedSlot> {
        let slots = self
            .find_available_slots(from, to, request.duration_minutes)
            .await;
        self.ranker.rank(&slots, request).await
    }

    /// Create the meeting in the calendar; reports success instead of failing
    pub async fn schedule(&self, request: &MeetingRequest, slot: &TimeSlot) -> bool {
        let event = NewEvent {
            title: request.title.clone(),
            description: (!request.description.is_empty()).then(|| request.description.clone()),
            location: None,
            start: slot.start,
            end: slot.end,
            attendees: request.attendees.clone(),
            timezone: self.timezone.name().to_string(),
        };

        match self.source.create_event(&event).await {
            Ok(()) => {
                info!("Scheduled '{}' at {}", request.title, slot.start);
                true
            }
            Err(e) => {
                error!("Failed to schedule '{}': {}", request.title, e);
                false
            }
        }
    }
}
