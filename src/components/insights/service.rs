use super::free_slots::FreeSlotCalculator;
use super::models::{DayAvailability, Task, TaskSuggestion};
use super::suggestions::TaskSuggestionGenerator;
use crate::components::google_calendar::EventSource;
use crate::config::SchedulingConfig;
use crate::error::AppResult;
use crate::utils::time::working_window;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{info, warn};

/// Everything shown in the day overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub date: NaiveDate,
    pub availability: DayAvailability,
    pub suggestions: Vec<TaskSuggestion>,
}

/// Fetches a day's events and turns them into free slots and suggestions
pub struct InsightsService<S: EventSource> {
    source: S,
    config: SchedulingConfig,
    timezone: Tz,
    calculator: FreeSlotCalculator,
    generator: TaskSuggestionGenerator,
}

impl<S: EventSource> InsightsService<S> {
    pub fn new(source: S, config: SchedulingConfig, timezone: Tz) -> Self {
        Self {
            calculator: FreeSlotCalculator::from_config(&config),
            generator: TaskSuggestionGenerator::from_config(&config),
            source,
            config,
            timezone,
        }
    }

    /// Recompute insights for `date`.
    ///
    /// A failed event fetch yields empty availability and no suggestions.
    pub async fn refresh(&self, date: NaiveDate, tasks: &[Task]) -> AppResult<Insights> {
        let (window_start, window_end) = working_window(
            date,
            &self.config.work_day_start,
            &self.config.work_day_end,
            &self.timezone,
        )?;

        let events = match self.source.fetch_events(window_start, window_end).await {
            Ok(events) => events,
            Err(e) => {
                warn!("Could not fetch events for {}: {}", date, e);
                return Ok(Insights {
                    date,
                    availability: DayAvailability::default(),
                    suggestions: Vec::new(),
                });
            }
        };

        let availability = self.calculator.calculate(&events, window_start, window_end);
        let suggestions = self.generator.generate(&availability.free, tasks);

        info!(
            "Insights for {}: {} free minutes, {} suggestions",
            date,
            availability.total_free_minutes(),
            suggestions.len()
        );

        Ok(Insights {
            date,
            availability,
            suggestions,
        })
    }
}
