use crate::config::Config;
use crate::error::{google_calendar_error, AppResult};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Google OAuth token endpoint
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens are refreshed this long before Google says they expire
const EXPIRY_MARGIN_SECONDS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// OAuth client credentials and refresh token, injected at construction
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl From<&Config> for GoogleCredentials {
    fn from(config: &Config) -> Self {
        Self {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            refresh_token: config.google_refresh_token.clone(),
        }
    }
}

/// Exchanges the refresh token for access tokens and caches them until expiry
#[derive(Clone)]
pub struct TokenManager {
    credentials: GoogleCredentials,
    token_uri: String,
    client: Client,
    cached: Arc<RwLock<Option<CachedToken>>>,
}

impl TokenManager {
    pub fn new(credentials: GoogleCredentials, client: Client) -> Self {
        Self {
            credentials,
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            client,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Point the manager at a different token endpoint
    pub fn with_token_uri(mut self, token_uri: &str) -> Self {
        self.token_uri = token_uri.to_string();
        self
    }

    /// Get a valid access token, refreshing it when the cached one is stale
    pub async fn get_token(&self) -> AppResult<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > Utc::now() {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let fresh = self.refresh_token().await?;
        let access_token = fresh.access_token.clone();
        *self.cached.write().await = Some(fresh);
        Ok(access_token)
    }

    /// Refresh the access token
    async fn refresh_token(&self) -> AppResult<CachedToken> {
        debug!("Refreshing Google access token");

        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(&self.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse token response: {}", e)))?;

        let access_token = token
            .access_token
            .ok_or_else(|| google_calendar_error("Token response missing 'access_token' field"))?;

        let expires_in = token.expires_in.unwrap_or(3600);
        let expires_at = Utc::now() + Duration::seconds(expires_in - EXPIRY_MARGIN_SECONDS);

        Ok(CachedToken {
            access_token,
            expires_at,
        })
    }
}
