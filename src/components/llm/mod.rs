pub mod gemini;
pub mod groq;
pub mod json;
pub mod retry;

pub use gemini::GeminiClient;
pub use groq::GroqClient;
pub use json::extract_json;
pub use retry::{RetryDelay, RetryPolicy};

use crate::config::{Config, LlmProvider};
use crate::error::AppResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Free-form text generation.
///
/// Output is expected, but not guaranteed, to embed JSON; callers parse
/// defensively with [`extract_json`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        (**self).generate(prompt).await
    }
}

/// Build the generator selected by the configuration
pub fn generator_from_config(config: &Config) -> Arc<dyn TextGenerator> {
    let retry = RetryPolicy::from_config(&config.scheduling);
    match config.llm.provider {
        LlmProvider::Gemini => Arc::new(GeminiClient::new(
            &config.llm.api_key,
            &config.llm.model,
            retry,
        )),
        LlmProvider::Groq => Arc::new(GroqClient::new(
            &config.llm.api_key,
            &config.llm.model,
            retry,
        )),
    }
}
