use super::retry::{parse_retry_after, parse_seconds_suffix, RetryPolicy};
use super::TextGenerator;
use crate::error::{llm_error, AppResult, Error};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Gemini REST root
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Gemini `generateContent` client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
    retry: RetryPolicy,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, retry: RetryPolicy) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            api_base: GEMINI_API_BASE.to_string(),
            retry,
            temperature: 0.2,
        }
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    async fn generate_once(&self, prompt: &str) -> AppResult<String> {
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": self.temperature },
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| llm_error(&format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let header_hint = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RateLimited {
                retry_after: header_hint.or_else(|| retry_delay_from_body(&body)),
            });
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(llm_error(&format!(
                "Gemini returned HTTP {} - {}",
                status, error_body
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| llm_error(&format!("Failed to parse Gemini response: {}", e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(llm_error("Gemini response contained no text"));
        }
        debug!("Gemini returned {} characters", text.len());
        Ok(text)
    }
}

/// Gemini reports its suggested wait as `error.details[].retryDelay`
fn retry_delay_from_body(body: &str) -> Option<Duration> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/details")?
        .as_array()?
        .iter()
        .filter_map(|detail| detail.get("retryDelay")?.as_str())
        .find_map(parse_seconds_suffix)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        info!("Requesting completion from Gemini model {}", self.model);
        self.retry.run(move || self.generate_once(prompt)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::llm::retry::RetryDelay;

    #[test]
    fn test_retry_delay_from_body() {
        let body = r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED","details":[
            {"@type":"type.googleapis.com/google.rpc.QuotaFailure"},
            {"@type":"type.googleapis.com/google.rpc.RetryInfo","retryDelay":"17s"}]}}"#;
        assert_eq!(retry_delay_from_body(body), Some(Duration::from_secs(17)));
        assert_eq!(retry_delay_from_body("not json"), None);
        let huge = r#"{"error":{"details":[{"retryDelay":"1e30s"}]}}"#;
        assert_eq!(retry_delay_from_body(huge), None);
    }

    #[tokio::test]
    async fn test_generate_concatenates_parts() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"[{\"index\":"},{"text":"0}]"}]}}]}"#)
            .create_async()
            .await;

        let client = GeminiClient::new("key", "gemini-test", RetryPolicy::none())
            .with_api_base(&server.url());
        let text = client.generate("pick").await.unwrap();
        assert_eq!(text, r#"[{"index":0}]"#);
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried_then_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-test:generateContent")
            .with_status(429)
            .with_header("retry-after", "0")
            .with_body(r#"{"error":{"code":429}}"#)
            .expect(3)
            .create_async()
            .await;

        let client = GeminiClient::new(
            "key",
            "gemini-test",
            RetryPolicy::new(2, RetryDelay::Fixed(Duration::ZERO)),
        )
        .with_api_base(&server.url());

        let err = client.generate("pick").await.unwrap_err();
        assert!(err.is_rate_limited());
        mock.assert_async().await;
    }
}
