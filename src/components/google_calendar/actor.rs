use super::models::{CalendarEvent, EventListResponse, InsertEventBody, NewEvent};
use super::time::to_calendar_event;
use super::token::{GoogleCredentials, TokenManager};
use crate::config::Config;
use crate::error::{google_calendar_error, AppResult};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

/// Google Calendar v3 REST root
pub const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    calendar_id: String,
    timezone: Tz,
    api_base: String,
    token_manager: TokenManager,
    client: Client,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    FetchEvents {
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        response_tx: mpsc::Sender<AppResult<Vec<CalendarEvent>>>,
    },
    CreateEvent {
        event: NewEvent,
        response_tx: mpsc::Sender<AppResult<()>>,
    },
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// Fetch events overlapping `time_min..time_max`
    pub async fn fetch_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarEvent>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(GoogleCalendarCommand::FetchEvents {
                time_min,
                time_max,
                response_tx,
            })
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| google_calendar_error("Response channel closed"))?
    }

    /// Insert a new event
    pub async fn create_event(&self, event: NewEvent) -> AppResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(GoogleCalendarCommand::CreateEvent { event, response_tx })
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| google_calendar_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(
        config: &Config,
        api_base: &str,
        token_uri: &str,
    ) -> AppResult<(Self, GoogleCalendarActorHandle)> {
        let (command_tx, command_rx) = mpsc::channel(32);
        let client = Client::new();

        let actor = Self {
            calendar_id: config.google_calendar_id.clone(),
            timezone: config.timezone()?,
            api_base: api_base.trim_end_matches('/').to_string(),
            token_manager: TokenManager::new(GoogleCredentials::from(config), client.clone())
                .with_token_uri(token_uri),
            client,
            command_rx,
        };

        let handle = GoogleCalendarActorHandle { command_tx };

        Ok((actor, handle))
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::FetchEvents {
                    time_min,
                    time_max,
                    response_tx,
                } => {
                    let result = self.fetch_events(time_min, time_max).await;
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::CreateEvent { event, response_tx } => {
                    let result = self.create_event(&event).await;
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }

    /// `{api_base}/calendars/{calendar_id}/events` with the id percent-encoded
    fn events_url(&self) -> AppResult<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| google_calendar_error(&format!("Invalid API base: {}", self.api_base)))?
            .pop_if_empty()
            .push("calendars")
            .push(&self.calendar_id)
            .push("events");
        Ok(url)
    }

    /// Fetch all pages of events in the window, ordered by start time
    async fn fetch_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarEvent>> {
        let access_token = self.token_manager.get_token().await?;
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.events_url()?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("timeMin", &time_min.to_rfc3339());
                query.append_pair("timeMax", &time_max.to_rfc3339());
                query.append_pair("singleEvents", "true");
                query.append_pair("orderBy", "startTime");
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self
                .client
                .get(url)
                .bearer_auth(&access_token)
                .send()
                .await
                .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Could not read error response".to_string());
                return Err(google_calendar_error(&format!(
                    "Failed to fetch events: HTTP {} - {}",
                    status, error_body
                )));
            }

            let page: EventListResponse = response.json().await.map_err(|e| {
                google_calendar_error(&format!("Failed to parse events response: {}", e))
            })?;

            let raw_count = page.items.len();
            events.extend(
                page.items
                    .into_iter()
                    .filter_map(|raw| to_calendar_event(raw, &self.timezone)),
            );
            debug!("Fetched page of {} events", raw_count);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        events.sort_by_key(|e| e.start);
        info!("Fetched {} events between {} and {}", events.len(), time_min, time_max);
        Ok(events)
    }

    async fn create_event(&self, event: &NewEvent) -> AppResult<()> {
        if event.end <= event.start {
            return Err(google_calendar_error("Event must end after it starts"));
        }

        let access_token = self.token_manager.get_token().await?;
        let body = InsertEventBody::from(event);

        let response = self
            .client
            .post(self.events_url()?)
            .bearer_auth(&access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to create event: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            warn!("Event creation rejected: HTTP {}", status);
            return Err(google_calendar_error(&format!(
                "Failed to create event: HTTP {} - {}",
                status, error_body
            )));
        }

        info!("Created event '{}' at {}", event.title, event.start);
        Ok(())
    }
}
