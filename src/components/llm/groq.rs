use super::retry::{parse_retry_after, RetryPolicy};
use super::TextGenerator;
use crate::error::{llm_error, AppResult, Error};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Groq's OpenAI-compatible API root
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Groq chat-completion client
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
    retry: RetryPolicy,
}

impl GroqClient {
    pub fn new(api_key: &str, model: &str, retry: RetryPolicy) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            api_base: GROQ_API_BASE.to_string(),
            retry,
        }
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    async fn generate_once(&self, prompt: &str) -> AppResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| llm_error(&format!("Groq request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            return Err(Error::RateLimited { retry_after });
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(llm_error(&format!(
                "Groq returned HTTP {} - {}",
                status, error_body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| llm_error(&format!("Failed to parse Groq response: {}", e)))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| llm_error("Groq response contained no message"))?;

        debug!("Groq returned {} characters", text.len());
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GroqClient {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        info!("Requesting completion from Groq model {}", self.model);
        self.retry.run(move || self.generate_once(prompt)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::llm::retry::RetryDelay;
    use std::time::Duration;

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#)
            .create_async()
            .await;

        let client = GroqClient::new("key", "llama", RetryPolicy::none()).with_api_base(&server.url());
        assert_eq!(client.generate("hi").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_rate_limit_exhausts_retries() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_header("retry-after", "0")
            .expect(3)
            .create_async()
            .await;

        let client = GroqClient::new(
            "key",
            "llama",
            RetryPolicy::new(2, RetryDelay::Fixed(Duration::ZERO)),
        )
        .with_api_base(&server.url());

        let err = client.generate("hi").await.unwrap_err();
        assert!(err.is_rate_limited());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("boom")
            .expect(1)
            .create_async()
            .await;

        let client = GroqClient::new(
            "key",
            "llama",
            RetryPolicy::new(2, RetryDelay::Fixed(Duration::ZERO)),
        )
        .with_api_base(&server.url());

        let err = client.generate("hi").await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        mock.assert_async().await;
    }
}
