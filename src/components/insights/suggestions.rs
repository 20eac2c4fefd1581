use super::models::{Priority, Task, TaskSuggestion, TimeSlot};
use crate::config::SchedulingConfig;

/// Description used when no pending task fits a slot
pub const FILLER_DESCRIPTION: &str = "Catch up on your inbox";

/// Maps free slots and pending tasks to at most one suggestion per slot
#[derive(Debug, Clone)]
pub struct TaskSuggestionGenerator {
    high_priority_minutes: i64,
    default_minutes: i64,
    max_tasks_per_suggestion: usize,
    focus_session_minutes: i64,
}

impl Default for TaskSuggestionGenerator {
    fn default() -> Self {
        Self::from_config(&SchedulingConfig::default())
    }
}

impl TaskSuggestionGenerator {
    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self {
            high_priority_minutes: config.high_priority_task_minutes,
            default_minutes: config.default_task_minutes,
            max_tasks_per_suggestion: config.max_tasks_per_suggestion,
            focus_session_minutes: config.focus_session_minutes,
        }
    }

    /// Estimated effort of a task in minutes
    pub fn estimate_minutes(&self, task: &Task) -> i64 {
        match task.priority {
            Priority::High => self.high_priority_minutes,
            _ => self.default_minutes,
        }
    }

    pub fn generate(&self, free_slots: &[TimeSlot], tasks: &[Task]) -> Vec<TaskSuggestion> {
        // Open high/medium tasks, kept in the caller's order
        let pending: Vec<&Task> = tasks
            .iter()
            .filter(|t| !t.completed && matches!(t.priority, Priority::High | Priority::Medium))
            .collect();

        free_slots
            .iter()
            .filter(|slot| !slot.is_empty())
            .map(|slot| self.suggest_for_slot(slot, &pending))
            .collect()
    }

    fn suggest_for_slot(&self, slot: &TimeSlot, pending: &[&Task]) -> TaskSuggestion {
        let suitable: Vec<&Task> = pending
            .iter()
            .copied()
            .filter(|t| self.estimate_minutes(t) <= slot.duration_minutes)
            .take(self.max_tasks_per_suggestion)
            .collect();
        let estimated_minutes = slot.duration_minutes.min(self.focus_session_minutes);

        // An empty bundle is a filler for every slot length, including focus-length ones
        let Some(first) = suitable.first() else {
            return TaskSuggestion {
                description: FILLER_DESCRIPTION.to_string(),
                estimated_minutes,
                priority: Priority::Medium,
                task_ids: Vec::new(),
                reason: format!(
                    "{} free minutes with no pending task that fits",
                    slot.duration_minutes
                ),
                slot: *slot,
            };
        };

        let bundled = &suitable;
        let priority = if bundled.iter().any(|t| t.priority == Priority::High) {
            Priority::High
        } else {
            Priority::Medium
        };

        let (description, reason) = if slot.duration_minutes >= self.focus_session_minutes {
            let titles: Vec<&str> = bundled.iter().map(|t| t.title.as_str()).collect();
            (
                format!(
                    "Focus session: {} {}",
                    bundled.len(),
                    if bundled.len() == 1 { "task" } else { "tasks" }
                ),
                format!(
                    "{} uninterrupted minutes is enough for deep work on: {}",
                    slot.duration_minutes,
                    titles.join(", ")
                ),
            )
        } else {
            (
                format!("Quick win: {}", first.title),
                format!(
                    "Fits in the {}-minute gap (about {} minutes of work)",
                    slot.duration_minutes,
                    self.estimate_minutes(first)
                ),
            )
        };

        TaskSuggestion {
            description,
            estimated_minutes,
            priority,
            task_ids: bundled.iter().map(|t| t.id.clone()).collect(),
            reason,
            slot: *slot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    fn slot(minutes: i64) -> TimeSlot {
        let start: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        TimeSlot::new(start, start + Duration::minutes(minutes))
    }

    fn task(id: &str, priority: Priority) -> Task {
        Task {
            id: id.to_string(),
            email_id: format!("email-{}", id),
            title: format!("Task {}", id),
            due_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            priority,
            completed: false,
        }
    }

    #[test]
    fn test_estimates() {
        let generator = TaskSuggestionGenerator::default();
        assert_eq!(generator.estimate_minutes(&task("a", Priority::High)), 90);
        assert_eq!(generator.estimate_minutes(&task("b", Priority::Medium)), 60);
        assert_eq!(generator.estimate_minutes(&task("c", Priority::Low)), 60);
    }

    #[test]
    fn test_long_slot_is_a_focus_session() {
        let tasks = vec![
            task("a", Priority::Medium),
            task("b", Priority::High),
            task("c", Priority::Medium),
        ];
        let suggestions = TaskSuggestionGenerator::default().generate(&[slot(180)], &tasks);

        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.description, "Focus session: 2 tasks");
        assert_eq!(s.task_ids, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(s.priority, Priority::High);
        assert_eq!(s.estimated_minutes, 120);
    }

    #[test]
    fn test_quick_win_bundles_in_input_order() {
        let tasks = vec![
            task("first", Priority::Medium),
            task("second", Priority::Medium),
            task("third", Priority::High),
        ];
        let suggestions = TaskSuggestionGenerator::default().generate(&[slot(100)], &tasks);

        let s = &suggestions[0];
        assert_eq!(s.description, "Quick win: Task first");
        assert_eq!(s.task_ids, vec!["first".to_string(), "second".to_string()]);
        assert_eq!(s.priority, Priority::Medium);
        assert_eq!(s.estimated_minutes, 100);
    }

    #[test]
    fn test_short_slot_is_a_quick_win() {
        let tasks = vec![task("a", Priority::High), task("b", Priority::Medium)];
        let suggestions = TaskSuggestionGenerator::default().generate(&[slot(75)], &tasks);

        // The high-priority task needs 90 minutes and does not fit
        let s = &suggestions[0];
        assert_eq!(s.description, "Quick win: Task b");
        assert_eq!(s.task_ids, vec!["b".to_string()]);
        assert_eq!(s.priority, Priority::Medium);
        assert_eq!(s.estimated_minutes, 75);
    }

    #[test]
    fn test_filler_when_nothing_fits() {
        let tasks = vec![task("a", Priority::Medium)];
        let suggestions = TaskSuggestionGenerator::default().generate(&[slot(45)], &tasks);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].description, FILLER_DESCRIPTION);
        assert!(suggestions[0].task_ids.is_empty());
        assert_eq!(suggestions[0].priority, Priority::Medium);
    }

    #[test]
    fn test_completed_and_low_priority_tasks_are_ignored() {
        let mut done = task("done", Priority::High);
        done.completed = true;
        let tasks = vec![done, task("low", Priority::Low)];
        let suggestions = TaskSuggestionGenerator::default().generate(&[slot(240)], &tasks);

        assert!(suggestions[0].task_ids.is_empty());
        assert_eq!(suggestions[0].description, FILLER_DESCRIPTION);
        assert_eq!(suggestions[0].estimated_minutes, 120);
    }

    #[test]
    fn test_bundle_limits_and_priority_rule() {
        let tasks: Vec<Task> = (0..5).map(|i| task(&i.to_string(), Priority::Medium)).collect();
        let slots = vec![slot(60), slot(120), slot(300)];
        let suggestions = TaskSuggestionGenerator::default().generate(&slots, &tasks);

        assert_eq!(suggestions.len(), slots.len());
        for s in &suggestions {
            assert!(s.task_ids.len() <= 2);
            assert_eq!(s.priority, Priority::Medium);
            assert!(s.estimated_minutes <= 120);
        }
    }

    #[test]
    fn test_configured_estimates() {
        let config = SchedulingConfig {
            high_priority_task_minutes: 45,
            ..Default::default()
        };
        let generator = TaskSuggestionGenerator::from_config(&config);
        let suggestions = generator.generate(&[slot(50)], &[task("a", Priority::High)]);

        assert_eq!(suggestions[0].task_ids, vec!["a".to_string()]);
        assert_eq!(suggestions[0].priority, Priority::High);
    }
}
