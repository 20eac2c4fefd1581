use crate::components::insights::TimeSlot;
use crate::config::SchedulingConfig;
use serde::{Deserialize, Serialize};

/// Hours of the day meetings may occupy, `start_hour..end_hour` local time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
        }
    }
}

impl WorkingHours {
    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self {
            start_hour: config.meeting_start_hour,
            end_hour: config.meeting_end_hour,
        }
    }
}

/// What the user wants to schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: i64,
    #[serde(default)]
    pub attendees: Vec<String>,
}

/// An hour-aligned candidate time and whether the calendar is clear then
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub slot: TimeSlot,
    pub available: bool,
}

/// A slot picked by a ranker, with the ranker's justification if it gave one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedSlot {
    pub slot: TimeSlot,
    pub reason: Option<String>,
}
