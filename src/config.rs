use crate::error::{config_error, env_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Default Google Calendar to read from and write to
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// Default location of the scheduling overrides file
pub const SCHEDULING_CONFIG_PATH: &str = "config/scheduling.toml";

/// Supported text-generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini,
    Groq,
}

impl LlmProvider {
    /// Parse a provider name as used in `LLM_PROVIDER`
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gemini" => Some(Self::Gemini),
            "groq" => Some(Self::Groq),
            _ => None,
        }
    }

    /// Model used when `LLM_MODEL` is not set
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.0-flash",
            Self::Groq => "llama-3.3-70b-versatile",
        }
    }

    /// Environment variable holding the provider's API key
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::Groq => "GROQ_API_KEY",
        }
    }
}

/// Credentials and model selection for the LLM provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub model: String,
}

/// Tunable heuristics for free-slot detection, task suggestions and meeting search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Start of the daily working window (HH:MM)
    pub work_day_start: String,
    /// End of the daily working window (HH:MM)
    pub work_day_end: String,
    /// Free slots shorter than this are dropped
    pub min_free_slot_minutes: i64,
    /// Estimated effort of a high-priority task
    pub high_priority_task_minutes: i64,
    /// Estimated effort of any other task
    pub default_task_minutes: i64,
    /// Maximum number of tasks bundled into one suggestion
    pub max_tasks_per_suggestion: usize,
    /// Slots at least this long become focus sessions; also caps suggested duration
    pub focus_session_minutes: i64,
    /// First hour of the day a meeting may start
    pub meeting_start_hour: u32,
    /// Hour by which every meeting must have ended
    pub meeting_end_hour: u32,
    /// Number of meeting times returned by the ranker
    pub max_ranked_slots: usize,
    /// Retries after a rate-limit response from the LLM provider
    pub llm_max_retries: u32,
    /// Delay between retries when the provider suggests none
    pub llm_retry_delay_ms: u64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            work_day_start: "09:00".to_string(),
            work_day_end: "18:00".to_string(),
            min_free_slot_minutes: 30,
            high_priority_task_minutes: 90,
            default_task_minutes: 60,
            max_tasks_per_suggestion: 2,
            focus_session_minutes: 120,
            meeting_start_hour: 9,
            meeting_end_hour: 17,
            max_ranked_slots: 3,
            llm_max_retries: 2,
            llm_retry_delay_ms: 2000,
        }
    }
}

impl SchedulingConfig {
    /// Load overrides from a TOML file, falling back to defaults when it is absent
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = toml::from_str::<Self>(&content)?;
        Ok(config)
    }
}

/// Session configuration passed explicitly to every component that needs credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google OAuth client ID
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Long-lived refresh token obtained out of band
    pub google_refresh_token: String,
    /// Google Calendar ID to read and write
    pub google_calendar_id: String,
    /// Text-generation provider settings
    pub llm: LlmConfig,
    /// IANA timezone used for working hours
    pub timezone: String,
    /// Scheduling heuristics
    pub scheduling: SchedulingConfig,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let google_client_id =
            env::var("GOOGLE_CLIENT_ID").map_err(|_| env_error("GOOGLE_CLIENT_ID"))?;
        let google_client_secret =
            env::var("GOOGLE_CLIENT_SECRET").map_err(|_| env_error("GOOGLE_CLIENT_SECRET"))?;
        let google_refresh_token =
            env::var("GOOGLE_REFRESH_TOKEN").map_err(|_| env_error("GOOGLE_REFRESH_TOKEN"))?;
        let google_calendar_id = env::var("GOOGLE_CALENDAR_ID")
            .unwrap_or_else(|_| String::from(DEFAULT_CALENDAR_ID));

        let provider_name = env::var("LLM_PROVIDER").unwrap_or_else(|_| String::from("gemini"));
        let provider = LlmProvider::parse(&provider_name).ok_or_else(|| {
            config_error(&format!("Unknown LLM_PROVIDER: {}", provider_name))
        })?;
        let api_key = env::var(provider.api_key_var()).map_err(|_| env_error(provider.api_key_var()))?;
        let model = env::var("LLM_MODEL").unwrap_or_else(|_| provider.default_model().to_string());

        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC"));

        let scheduling = SchedulingConfig::load_from(Path::new(SCHEDULING_CONFIG_PATH))?;

        let config = Config {
            google_client_id,
            google_client_secret,
            google_refresh_token,
            google_calendar_id,
            llm: LlmConfig {
                provider,
                api_key,
                model,
            },
            timezone,
            scheduling,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse the configured timezone
    pub fn timezone(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid timezone: {}", self.timezone)))
    }

    /// Check values that would otherwise fail deep inside a computation
    pub fn validate(&self) -> AppResult<()> {
        self.timezone()?;
        let s = &self.scheduling;
        if crate::utils::time::parse_time(&s.work_day_start).is_none()
            || crate::utils::time::parse_time(&s.work_day_end).is_none()
        {
            return Err(config_error("Working window must use HH:MM format"));
        }
        if s.meeting_start_hour >= s.meeting_end_hour || s.meeting_end_hour > 24 {
            return Err(config_error("Meeting hours must satisfy start < end <= 24"));
        }
        if s.min_free_slot_minutes < 0 {
            return Err(config_error("min_free_slot_minutes must not be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            google_client_id: "id".to_string(),
            google_client_secret: "secret".to_string(),
            google_refresh_token: "refresh".to_string(),
            google_calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            llm: LlmConfig {
                provider: LlmProvider::Groq,
                api_key: "key".to_string(),
                model: LlmProvider::Groq.default_model().to_string(),
            },
            timezone: "Europe/Helsinki".to_string(),
            scheduling: SchedulingConfig::default(),
        }
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(LlmProvider::parse("Gemini"), Some(LlmProvider::Gemini));
        assert_eq!(LlmProvider::parse(" groq "), Some(LlmProvider::Groq));
        assert_eq!(LlmProvider::parse("openai"), None);
    }

    #[test]
    fn test_scheduling_overrides_keep_defaults() {
        let parsed: SchedulingConfig =
            toml::from_str("min_free_slot_minutes = 15\nwork_day_end = \"17:30\"").unwrap();
        assert_eq!(parsed.min_free_slot_minutes, 15);
        assert_eq!(parsed.work_day_end, "17:30");
        assert_eq!(parsed.work_day_start, "09:00");
        assert_eq!(parsed.high_priority_task_minutes, 90);
    }

    #[test]
    fn test_missing_scheduling_file_uses_defaults() {
        let config = SchedulingConfig::load_from(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(config, SchedulingConfig::default());
    }

    #[test]
    fn test_validate() {
        let config = test_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::Helsinki);

        let mut bad_tz = test_config();
        bad_tz.timezone = "Mars/Olympus".to_string();
        assert!(bad_tz.validate().is_err());

        let mut bad_hours = test_config();
        bad_hours.scheduling.meeting_start_hour = 18;
        assert!(bad_hours.validate().is_err());

        let mut bad_window = test_config();
        bad_window.scheduling.work_day_start = "9am".to_string();
        assert!(bad_window.validate().is_err());
    }
}
