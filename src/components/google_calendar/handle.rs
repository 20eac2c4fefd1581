use super::actor::{GoogleCalendarActor, GoogleCalendarActorHandle, GOOGLE_CALENDAR_API};
use super::models::{CalendarEvent, NewEvent};
use super::token::GOOGLE_TOKEN_URI;
use super::EventSource;
use crate::config::Config;
use crate::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(config: &Config) -> AppResult<Self> {
        Self::with_endpoints(config, GOOGLE_CALENDAR_API, GOOGLE_TOKEN_URI)
    }

    /// Same as `new` but against custom API and token endpoints
    pub fn with_endpoints(config: &Config, api_base: &str, token_uri: &str) -> AppResult<Self> {
        let (mut actor, handle) = GoogleCalendarActor::new(config, api_base, token_uri)?;

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Ok(Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        })
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl EventSource for GoogleCalendarHandle {
    async fn fetch_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarEvent>> {
        self.actor_handle.fetch_events(time_min, time_max).await
    }

    async fn create_event(&self, event: &NewEvent) -> AppResult<()> {
        self.actor_handle.create_event(event.clone()).await
    }
}
