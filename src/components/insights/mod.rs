pub mod free_slots;
pub mod models;
pub mod service;
pub mod suggestions;

pub use free_slots::FreeSlotCalculator;
pub use models::{DayAvailability, Priority, Task, TaskSuggestion, TimeSlot};
pub use service::{Insights, InsightsService};
pub use suggestions::TaskSuggestionGenerator;
