//! Generation service boundary: wire types, the port trait and the HTTP client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default `generateContent` endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Transport timeout for generation requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Maximum characters of service diagnostics kept in an error.
const DETAIL_LIMIT: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(String),
    #[error("generation service returned status {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
    #[error("generation service returned no text")]
    EmptyText,
    #[error("generation client misconfigured: {0}")]
    Config(String),
}

impl GenerationError {
    pub fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            detail: truncate_detail(body),
        }
    }

    pub fn malformed(detail: impl ToString) -> Self {
        Self::MalformedResponse(truncate_detail(&detail.to_string()))
    }
}

/// Shortens diagnostic text to a fixed number of characters.
pub fn truncate_detail(detail: &str) -> String {
    let detail = detail.trim();
    if detail.chars().count() <= DETAIL_LIMIT {
        return detail.to_string();
    }
    let mut cut: String = detail.chars().take(DETAIL_LIMIT).collect();
    cut.push('…');
    cut
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

impl GenerateRequest {
    /// A single user turn carrying one instruction.
    pub fn from_instruction(instruction: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: instruction.into(),
                }],
            }],
        }
    }

    pub fn instruction(&self) -> Option<&str> {
        self.contents
            .first()
            .and_then(|c| c.parts.first())
            .map(|p| p.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub content: Content,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    pub fn into_text(self) -> Result<String, GenerationError> {
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| GenerationError::malformed("no candidates in response"))?;
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyText);
        }
        Ok(text)
    }
}

/// Parses a raw response body into its generated text.
pub fn parse_response(body: &str) -> Result<String, GenerationError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(GenerationError::malformed)?;
    response.into_text()
}

// =============================================================================
// Port
// =============================================================================

/// Anything that turns one instruction into generated text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationPort: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GenerationError>;
}

#[async_trait]
impl<T: GenerationPort + ?Sized> GenerationPort for Arc<T> {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GenerationError> {
        (**self).generate(request).await
    }
}

// =============================================================================
// HTTP client
// =============================================================================

/// Endpoint, key and timeout for the generation service.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl GenerationConfig {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads `SCENE_PROMPT_ENDPOINT` (optional) and `SCENE_PROMPT_API_KEY`.
    pub fn from_env() -> Result<Self, GenerationError> {
        let endpoint = std::env::var("SCENE_PROMPT_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let api_key = std::env::var("SCENE_PROMPT_API_KEY")
            .map_err(|_| GenerationError::Config("SCENE_PROMPT_API_KEY is not set".to_string()))?;
        Ok(Self::new(&endpoint, &api_key))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// reqwest-backed client for a `generateContent`-style service.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GenerationConfig,
}

impl GeminiClient {
    pub fn new(config: GenerationConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }

    pub fn from_env() -> Result<Self, GenerationError> {
        Ok(Self::new(GenerationConfig::from_env()?))
    }
}

#[async_trait]
impl GenerationPort for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GenerationError> {
        tracing::debug!(endpoint = %self.config.endpoint, "sending generation request");

        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "generation service rejected request");
            return Err(GenerationError::status(status.as_u16(), &body));
        }

        parse_response(&body)
    }
}
