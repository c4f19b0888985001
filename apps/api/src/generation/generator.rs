//! Question Generation: orchestrates the generation pipeline.
//!
//! Flow: sanitize → detect_language → localized prompt → cached/retried
//!       model call → parse → local validation → Vec<Question>.
//!
//! Either exactly five validated questions come back, or an `LlmError`.
//! Validation failures are never retried: the same input would fail again.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::generation::backend::{DemoBackend, LiveBackend, QuestionBackend};
use crate::generation::sanitize::sanitize;
use crate::generation::schema::{validate_questions, Question};
use crate::llm_client::cache::{CacheStats, DEFAULT_TTL};
use crate::llm_client::{ClientOptions, HttpTransport, LlmClient, LlmError};

pub const QUALITY_FAILURE: &str = "Generated questions do not meet quality requirements";

/// Everything needed to build a generator. Built from `Config` in production,
/// by hand in tests.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: Option<String>,
    pub demo_flag: bool,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub app_url: String,
}

impl GeneratorConfig {
    /// Demo mode is decided by the credential alone; the explicit flag can
    /// only ask for what a missing credential already implies.
    pub fn wants_demo(&self) -> bool {
        self.api_key
            .as_deref()
            .map_or(true, |key| key.trim().is_empty())
    }
}

pub struct QuestionGenerator {
    backend: Arc<dyn QuestionBackend>,
}

impl QuestionGenerator {
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, reqwest::Error> {
        if config.wants_demo() {
            warn!("Question generator running in DEMO MODE - using mock responses");
            return Ok(Self::with_backend(Arc::new(DemoBackend)));
        }

        if config.demo_flag {
            warn!("DEMO_MODE is set but an API key is configured; running live");
        }

        let api_key = config.api_key.clone().unwrap_or_default();
        let transport = HttpTransport::new(&config.base_url, api_key, config.app_url.clone())?;
        let llm = LlmClient::new(
            Arc::new(transport),
            ClientOptions {
                model: config.model.clone(),
                timeout: config.timeout,
                max_retries: config.max_retries,
                backoff_unit: Duration::from_secs(1),
                cache_ttl: DEFAULT_TTL,
            },
        );
        info!(
            "Question generator running in LIVE MODE (model: {})",
            config.model
        );
        Ok(Self::with_backend(Arc::new(LiveBackend::new(llm))))
    }

    pub fn with_backend(backend: Arc<dyn QuestionBackend>) -> Self {
        Self { backend }
    }

    pub fn is_demo_mode(&self) -> bool {
        self.backend.is_demo()
    }

    pub fn model(&self) -> Option<&str> {
        self.backend.model()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.backend.cache_stats()
    }

    pub fn clear_cache(&self) {
        self.backend.clear_cache();
    }

    /// Generates exactly five interview questions for a job posting.
    ///
    /// Steps:
    /// 1. sanitize() → markup-free, length-capped text
    /// 2. detect_language() → selects the localized system prompt
    /// 3. backend.generate() → raw question strings
    /// 4. map to `Question` with default category/difficulty
    /// 5. validate_questions() → exactly 5, each 20–300 chars
    pub async fn generate_questions(&self, job_posting: &str) -> Result<Vec<Question>, LlmError> {
        let posting = sanitize(job_posting);
        let language = self.backend.detect_language(&posting).await;
        info!(
            "Generating questions (language={language}, demo={})",
            self.is_demo_mode()
        );

        let texts = self.backend.generate(language, &posting).await?;
        let questions: Vec<Question> = texts
            .into_iter()
            .map(|text| Question::general(text.trim()))
            .collect();

        if let Err(issues) = validate_questions(&questions) {
            let details: Vec<String> = issues
                .iter()
                .map(|i| format!("{}: {}", i.field, i.message))
                .collect();
            warn!("Model output rejected: {}", details.join("; "));
            return Err(LlmError::InvalidResponse(QUALITY_FAILURE.to_string()));
        }

        info!("Generated {} questions", questions.len());
        Ok(questions)
    }
}
