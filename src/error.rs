use miette::{Diagnostic, Result};
use std::time::Duration;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(mailmind::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(mailmind::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(mailmind::google_calendar))]
    GoogleCalendar(String),

    #[error("LLM provider error: {0}")]
    #[diagnostic(code(mailmind::llm))]
    Llm(String),

    #[error("Rate limited by upstream service")]
    #[diagnostic(
        code(mailmind::rate_limited),
        help("the request is retried according to the configured retry policy")
    )]
    RateLimited { retry_after: Option<Duration> },

    #[error(transparent)]
    #[diagnostic(code(mailmind::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(mailmind::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(mailmind::other))]
    Other(String),
}

impl Error {
    /// Whether the error is a rate-limit response that may be retried
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create LLM errors
pub fn llm_error(message: &str) -> Error {
    Error::Llm(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
