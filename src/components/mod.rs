// Export components
pub mod google_calendar;
pub mod insights;
pub mod llm;
pub mod meetings;

// Re-export the calendar seam
pub use google_calendar::{EventSource, GoogleCalendarHandle};
