use chrono::{Duration, Utc};
use mailmind::components::insights::InsightsService;
use mailmind::components::llm::generator_from_config;
use mailmind::components::meetings::{LlmSlotRanker, MeetingRequest, MeetingScheduler, WorkingHours};
use mailmind::components::GoogleCalendarHandle;
use mailmind::startup;
use std::env;
use std::path::Path;
use tracing::{info, warn};

/// Days searched for meeting times
const MEETING_SEARCH_DAYS: i64 = 5;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting mailmind");

    // Load configuration
    let config = startup::load_config()?;
    let timezone = config.timezone()?;
    let today = Utc::now().with_timezone(&timezone).date_naive();

    let tasks = match env::var("TASKS_FILE") {
        Ok(path) => startup::load_tasks(Path::new(&path))?,
        Err(_) => Vec::new(),
    };

    let calendar = GoogleCalendarHandle::new(&config)?;

    let insights = InsightsService::new(calendar.clone(), config.scheduling.clone(), timezone)
        .refresh(today, &tasks)
        .await?;

    for slot in &insights.availability.busy {
        info!("Busy: {}", slot);
    }
    for slot in &insights.availability.free {
        info!("Free: {}", slot);
    }
    for suggestion in &insights.suggestions {
        info!(
            "[{}] {} ({} min) - {}",
            suggestion.priority, suggestion.description, suggestion.estimated_minutes, suggestion.reason
        );
    }

    let ranker = LlmSlotRanker::with_limit(
        generator_from_config(&config),
        timezone,
        config.scheduling.max_ranked_slots,
    );
    let scheduler = MeetingScheduler::new(
        calendar.clone(),
        ranker,
        WorkingHours::from_config(&config.scheduling),
        timezone,
    );
    let request = MeetingRequest {
        title: "Follow-up call".to_string(),
        description: "30 minutes to go through open email threads".to_string(),
        duration_minutes: 30,
        attendees: Vec::new(),
    };

    let suggested = scheduler
        .suggest_times(today, today + Duration::days(MEETING_SEARCH_DAYS - 1), &request)
        .await;
    if suggested.is_empty() {
        warn!("No meeting times available");
    }
    for ranked in &suggested {
        info!(
            "Meeting option: {} {}",
            ranked.slot.start.with_timezone(&timezone).format("%a %d.%m. %H:%M"),
            ranked.reason.as_deref().unwrap_or("")
        );
    }

    calendar.shutdown().await?;
    Ok(())
}
