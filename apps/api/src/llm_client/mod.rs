/// LLM Client: the single point of entry for all chat-completion calls in InterviewPrep.
///
/// ARCHITECTURAL RULE: No other module may call the model provider directly.
/// All LLM interactions MUST go through this module.
///
/// Every call is cache-checked, time-limited and retried with exponential
/// backoff. Failures surface as a classified `LlmError` with a stable code.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod cache;
pub mod prompts;

use cache::{CacheStats, ResponseCache, DEFAULT_TTL};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";
pub const CHAT_COMPLETIONS: &str = "/chat/completions";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
const APP_TITLE: &str = "InterviewPrep";

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Stable, machine-readable error codes. Callers branch on these, never on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ApiKeyInvalid,
    RateLimit,
    Timeout,
    ServerError,
    InvalidResponse,
    UnknownError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ApiKeyInvalid => "API_KEY_INVALID",
            ErrorCode::RateLimit => "RATE_LIMIT",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::ServerError => "SERVER_ERROR",
            ErrorCode::InvalidResponse => "INVALID_RESPONSE",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw outcome of a single failed attempt, before classification.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Invalid API key")]
    ApiKeyInvalid(#[source] TransportError),

    #[error("Rate limit exceeded")]
    RateLimit(#[source] TransportError),

    #[error("Request timed out")]
    Timeout(#[source] TransportError),

    #[error("Model provider server error")]
    Server(#[source] TransportError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unexpected error: {0}")]
    Unknown(#[source] TransportError),
}

impl LlmError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LlmError::ApiKeyInvalid(_) => ErrorCode::ApiKeyInvalid,
            LlmError::RateLimit(_) => ErrorCode::RateLimit,
            LlmError::Timeout(_) => ErrorCode::Timeout,
            LlmError::Server(_) => ErrorCode::ServerError,
            LlmError::InvalidResponse(_) => ErrorCode::InvalidResponse,
            LlmError::Unknown(_) => ErrorCode::UnknownError,
        }
    }

    /// Maps a transport outcome to its classified error.
    pub fn classify(err: TransportError) -> Self {
        let code = match &err {
            TransportError::Timeout(_) => ErrorCode::Timeout,
            TransportError::Network(e) if e.is_timeout() => ErrorCode::Timeout,
            TransportError::Status { status: 401, .. } => ErrorCode::ApiKeyInvalid,
            TransportError::Status { status: 429, .. } => ErrorCode::RateLimit,
            TransportError::Status { status, .. } if (500..600).contains(status) => {
                ErrorCode::ServerError
            }
            _ => ErrorCode::UnknownError,
        };
        match code {
            ErrorCode::Timeout => LlmError::Timeout(err),
            ErrorCode::ApiKeyInvalid => LlmError::ApiKeyInvalid(err),
            ErrorCode::RateLimit => LlmError::RateLimit(err),
            ErrorCode::ServerError => LlmError::Server(err),
            ErrorCode::InvalidResponse | ErrorCode::UnknownError => LlmError::Unknown(err),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text content of the first choice, if the model returned any.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transport
// ────────────────────────────────────────────────────────────────────────────

/// One raw POST against the provider. Retry, timeout and caching live in
/// `LlmClient`; implementations only report what happened.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post(&self, endpoint: &str, payload: &Value) -> Result<Value, TransportError>;
}

/// OpenRouter-compatible HTTP transport.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
    app_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_key: String, app_url: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            app_url,
        })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn post(&self, endpoint: &str, payload: &Value) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, endpoint))
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .header("HTTP-Referer", &self.app_url)
            .header("X-Title", APP_TITLE)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!("Could not read body of HTTP {status} response: {e}");
                    String::new()
                }
            };
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub model: String,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Backoff after failed attempt `n` is `2^n × backoff_unit`.
    pub backoff_unit: Duration,
    pub cache_ttl: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_unit: Duration::from_secs(1),
            cache_ttl: DEFAULT_TTL,
        }
    }
}

/// The single LLM client used by all services in InterviewPrep.
/// Owns its response cache, so independently built clients never share entries.
#[derive(Clone)]
pub struct LlmClient {
    transport: Arc<dyn ChatTransport>,
    cache: ResponseCache,
    options: ClientOptions,
}

impl LlmClient {
    pub fn new(transport: Arc<dyn ChatTransport>, options: ClientOptions) -> Self {
        Self {
            transport,
            cache: ResponseCache::new(options.cache_ttl),
            options,
        }
    }

    pub fn model(&self) -> &str {
        &self.options.model
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// POSTs `payload` to `endpoint`, serving from cache when allowed.
    /// Retries every failure kind up to `max_retries` attempts in total, then
    /// returns the classified error of the last attempt.
    pub async fn request(
        &self,
        endpoint: &str,
        payload: &Value,
        use_cache: bool,
    ) -> Result<Value, LlmError> {
        let cache_key = use_cache.then(|| ResponseCache::key_for(endpoint, payload));

        if let Some(key) = &cache_key {
            if let Some(hit) = self.cache.get(key) {
                debug!("LLM cache hit for {endpoint}");
                return Ok((*hit).clone());
            }
        }

        let max_attempts = self.options.max_retries.max(1);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let outcome = match tokio::time::timeout(
                self.options.timeout,
                self.transport.post(endpoint, payload),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(TransportError::Timeout(self.options.timeout)),
            };

            match outcome {
                Ok(body) => {
                    debug!("LLM call to {endpoint} succeeded on attempt {attempt}");
                    if let Some(key) = cache_key {
                        self.cache.set(key, body.clone());
                    }
                    return Ok(body);
                }
                Err(err) if attempt >= max_attempts => {
                    let classified = LlmError::classify(err);
                    warn!(
                        "LLM call to {endpoint} failed after {attempt} attempts: {} ({classified})",
                        classified.code()
                    );
                    return Err(classified);
                }
                Err(err) => {
                    // Exponential backoff: 2s, 4s, 8s...
                    let delay = self
                        .options
                        .backoff_unit
                        .saturating_mul(2u32.saturating_pow(attempt));
                    warn!(
                        "LLM call attempt {attempt} failed ({err}), retrying after {}ms...",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Sends a chat-completion request and decodes the provider's envelope.
    pub async fn chat(
        &self,
        request: &ChatRequest<'_>,
        use_cache: bool,
    ) -> Result<ChatResponse, LlmError> {
        let payload = serde_json::to_value(request)
            .map_err(|e| LlmError::InvalidResponse(format!("Unserializable request: {e}")))?;
        let body = self.request(CHAT_COMPLETIONS, &payload, use_cache).await?;
        serde_json::from_value(body)
            .map_err(|e| LlmError::InvalidResponse(format!("Malformed chat completion: {e}")))
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
