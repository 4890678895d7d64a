//! Gemini `generateContent` client.
//!
//! One blocking-style call per prompt, with an explicit request timeout
//! and a small bounded retry for transient failures. A well-formed
//! response without extractable text is not an error: it degrades to the
//! raw response body (see [`parse_completion`]).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use campusrag_core::types::Completion;

use crate::error::LlmError;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
const BACKOFF_BASE_MS: u64 = 500;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_attempts: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: String,
        timeout: Duration,
        max_attempts: u32,
    ) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingCredential);
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::Transport)?;
        Ok(Self {
            client,
            api_key,
            model,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_attempts: max_attempts.max(1),
        })
    }

    /// Point the client at a different base URL (tests, proxies).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn generate(&self, prompt: &str) -> Result<Completion, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt.to_string() }] }],
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.try_once(&url, &request).await {
                Ok(completion) => return Ok(completion),
                Err(e) if attempt < self.max_attempts && e.is_retryable() => {
                    let backoff = Duration::from_millis(BACKOFF_BASE_MS << (attempt - 1));
                    tracing::warn!(attempt, error = %e, "completion call failed, retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_once(
        &self,
        url: &str,
        request: &GenerateRequest,
    ) -> Result<Completion, LlmError> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(LlmError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(LlmError::Transport)?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api { status: status.as_u16(), message });
        }
        Ok(parse_completion(&body))
    }
}

#[async_trait::async_trait]
impl campusrag_core::traits::CompletionProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<Completion> {
        Ok(GeminiClient::generate(self, prompt).await?)
    }
}

/// Extract candidate text from a `generateContent` response body.
///
/// All text parts are concatenated into `Completion::Text`. A body that
/// parses but carries no text (empty candidates, safety-blocked response,
/// parts without a `text` field) becomes `Completion::Degraded` with the
/// raw body, so the caller still sees what came back.
pub fn parse_completion(body: &str) -> Completion {
    if let Ok(parsed) = serde_json::from_str::<GenerateResponse>(body) {
        let text: String = parsed
            .candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect();
        if !text.trim().is_empty() {
            return Completion::Text(text);
        }
    }
    Completion::Degraded(body.to_string())
}
