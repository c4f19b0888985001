//! Question backends: the live/demo strategy behind `QuestionGenerator`.
//!
//! Default: `LiveBackend` (chat-completions via `LlmClient`).
//! Fallback: `DemoBackend` (static mock data, no network), chosen once at
//! construction when no credential is configured.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::generation::demo;
use crate::generation::language::Language;
use crate::generation::prompts::generation_system_prompt;
use crate::generation::sanitize::{prefix_chars, sanitize};
use crate::llm_client::cache::CacheStats;
use crate::llm_client::prompts::{questions_response_format, LANGUAGE_DETECTION_SYSTEM};
use crate::llm_client::{strip_json_fences, ChatMessage, ChatRequest, LlmClient, LlmError};

/// Characters of the posting sent for language detection.
const DETECTION_SAMPLE_CHARS: usize = 1000;
const DETECTION_MAX_TOKENS: u32 = 10;
const GENERATION_TEMPERATURE: f64 = 0.7;
const GENERATION_MAX_TOKENS: u32 = 1000;

#[async_trait]
pub trait QuestionBackend: Send + Sync {
    fn is_demo(&self) -> bool;

    /// Never fails; unknown or unreachable answers map to a fallback language.
    async fn detect_language(&self, text: &str) -> Language;

    /// Raw question texts for an already sanitized posting. Not yet validated.
    async fn generate(&self, language: Language, posting: &str) -> Result<Vec<String>, LlmError>;

    fn model(&self) -> Option<&str>;

    fn cache_stats(&self) -> CacheStats;

    fn clear_cache(&self);
}

// ────────────────────────────────────────────────────────────────────────────
// LiveBackend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GeneratedPayload {
    questions: Vec<String>,
}

pub struct LiveBackend {
    llm: LlmClient,
}

impl LiveBackend {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl QuestionBackend for LiveBackend {
    fn is_demo(&self) -> bool {
        false
    }

    async fn detect_language(&self, text: &str) -> Language {
        let sample = sanitize(prefix_chars(text, DETECTION_SAMPLE_CHARS));
        let request = ChatRequest {
            model: self.llm.model(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: LANGUAGE_DETECTION_SYSTEM,
                },
                ChatMessage {
                    role: "user",
                    content: &sample,
                },
            ],
            response_format: None,
            temperature: 0.0,
            max_tokens: DETECTION_MAX_TOKENS,
        };

        match self.llm.chat(&request, true).await {
            Ok(response) => {
                let detected = response
                    .content()
                    .and_then(Language::from_code)
                    .unwrap_or_default();
                debug!("Model detected language: {detected}");
                detected
            }
            Err(e) => {
                warn!(
                    "Language detection failed ({}), using keyword heuristic",
                    e.code()
                );
                Language::detect_by_keywords(text)
            }
        }
    }

    async fn generate(&self, language: Language, posting: &str) -> Result<Vec<String>, LlmError> {
        let system = generation_system_prompt(language);
        let request = ChatRequest {
            model: self.llm.model(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: posting,
                },
            ],
            response_format: Some(questions_response_format()),
            temperature: GENERATION_TEMPERATURE,
            max_tokens: GENERATION_MAX_TOKENS,
        };

        let response = self.llm.chat(&request, true).await?;
        let content = response
            .content()
            .ok_or_else(|| LlmError::InvalidResponse("No content in API response".to_string()))?;

        let parsed: Value = serde_json::from_str(strip_json_fences(content))
            .map_err(|_| LlmError::InvalidResponse("Failed to parse JSON response".to_string()))?;

        let payload: GeneratedPayload = serde_json::from_value(parsed).map_err(|_| {
            LlmError::InvalidResponse("Response has no questions array".to_string())
        })?;

        Ok(payload.questions)
    }

    fn model(&self) -> Option<&str> {
        Some(self.llm.model())
    }

    fn cache_stats(&self) -> CacheStats {
        self.llm.cache_stats()
    }

    fn clear_cache(&self) {
        self.llm.clear_cache();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DemoBackend
// ────────────────────────────────────────────────────────────────────────────

/// Static mock data with a simulated delay. Never touches the network and never fails.
pub struct DemoBackend;

#[async_trait]
impl QuestionBackend for DemoBackend {
    fn is_demo(&self) -> bool {
        true
    }

    async fn detect_language(&self, text: &str) -> Language {
        Language::detect_by_keywords(text)
    }

    async fn generate(&self, language: Language, _posting: &str) -> Result<Vec<String>, LlmError> {
        tokio::time::sleep(demo::simulated_latency()).await;
        Ok(demo::shuffled_questions(language))
    }

    fn model(&self) -> Option<&str> {
        None
    }

    fn cache_stats(&self) -> CacheStats {
        CacheStats {
            size: 0,
            entries: 0,
        }
    }

    fn clear_cache(&self) {}
}
