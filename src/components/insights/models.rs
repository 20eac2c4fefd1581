use crate::utils::time::days_until;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A contiguous interval, used for both busy and free periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl TimeSlot {
    /// Build a slot; an inverted span collapses to zero length at `start`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let end = end.max(start);
        Self {
            start,
            end,
            duration_minutes: (end - start).num_minutes(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({} min)",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%H:%M"),
            self.duration_minutes
        )
    }
}

/// Busy and free periods of one working window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub busy: Vec<TimeSlot>,
    pub free: Vec<TimeSlot>,
}

impl DayAvailability {
    pub fn total_free_minutes(&self) -> i64 {
        self.free.iter().map(|s| s.duration_minutes).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(name)
    }
}

/// A follow-up extracted from an email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub email_id: String,
    pub title: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// New open task with a generated id
    pub fn new(email_id: &str, title: &str, due_date: NaiveDate, priority: Priority) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email_id: email_id.to_string(),
            title: title.to_string(),
            due_date,
            priority,
            completed: false,
        }
    }

    /// Days remaining until the due date as seen from `today`, never negative
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        days_until(today, self.due_date)
    }
}

/// Proposed use of a free slot. Recomputed on every refresh, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSuggestion {
    pub description: String,
    pub estimated_minutes: i64,
    pub priority: Priority,
    pub task_ids: Vec<String>,
    pub reason: String,
    /// The free slot this suggestion fills
    pub slot: TimeSlot,
}
