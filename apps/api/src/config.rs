use std::time::Duration;

use anyhow::{Context, Result};

use crate::generation::generator::GeneratorConfig;
use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_TIMEOUT};

/// Application configuration loaded from environment variables.
/// Nothing is strictly required: a missing API key means demo mode, a missing
/// database means the in-memory store, missing Supabase settings mean header auth.
#[derive(Clone)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    pub demo_mode: bool,
    pub model: String,
    pub base_url: String,
    pub llm_timeout: Duration,
    pub llm_max_retries: u32,
    pub app_url: String,
    pub database_url: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

// Hand-written so the credentials never end up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("openrouter_api_key", &self.openrouter_api_key.as_ref().map(|_| "<set>"))
            .field("demo_mode", &self.demo_mode)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("llm_timeout", &self.llm_timeout)
            .field("llm_max_retries", &self.llm_max_retries)
            .field("app_url", &self.app_url)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &self.supabase_anon_key.as_ref().map(|_| "<set>"))
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            demo_mode: parse_flag(optional_env("DEMO_MODE").as_deref()),
            model: optional_env("OPENROUTER_DEFAULT_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: optional_env("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llm_timeout: match optional_env("LLM_TIMEOUT_SECS") {
                Some(raw) => parse_timeout(&raw)?,
                None => DEFAULT_TIMEOUT,
            },
            llm_max_retries: match optional_env("LLM_MAX_RETRIES") {
                Some(raw) => parse_retries(&raw)?,
                None => DEFAULT_MAX_RETRIES,
            },
            app_url: optional_env("APP_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            database_url: optional_env("DATABASE_URL"),
            supabase_url: optional_env("SUPABASE_URL"),
            supabase_anon_key: optional_env("SUPABASE_ANON_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            api_key: self.openrouter_api_key.clone(),
            demo_flag: self.demo_mode,
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout: self.llm_timeout,
            max_retries: self.llm_max_retries,
            app_url: self.app_url.clone(),
        }
    }
}

/// Unset and blank variables are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(str::to_ascii_lowercase).as_deref(),
        Some("true" | "1" | "yes")
    )
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    let secs = raw
        .parse::<u64>()
        .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?;
    anyhow::ensure!(secs >= 1, "LLM_TIMEOUT_SECS must be at least 1");
    Ok(Duration::from_secs(secs))
}

fn parse_retries(raw: &str) -> Result<u32> {
    let retries = raw
        .parse::<u32>()
        .context("LLM_MAX_RETRIES must be a positive integer")?;
    anyhow::ensure!(retries >= 1, "LLM_MAX_RETRIES must be at least 1");
    Ok(retries)
}
