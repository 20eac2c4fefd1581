mod actor;
mod handle;
pub mod models;
pub mod token;
mod time;

pub use actor::GOOGLE_CALENDAR_API;
pub use handle::GoogleCalendarHandle;
pub use models::{CalendarEvent, EventOrigin, NewEvent};

use crate::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of calendar events.
///
/// Implemented by [`GoogleCalendarHandle`]; tests plug in in-memory sources.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events overlapping `time_min..time_max`, sorted by start
    async fn fetch_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarEvent>>;

    /// Create an event in the calendar
    async fn create_event(&self, event: &NewEvent) -> AppResult<()>;
}
