//! Axum route handlers for the Generation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::generation::schema::validate_job_posting;
use crate::llm_client::cache::CacheStats;
use crate::models::question::QuestionDto;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub job_posting: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub questions: Vec<QuestionDto>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LlmStatusResponse {
    pub demo_mode: bool,
    pub model: Option<String>,
    pub cache: CacheStats,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/questions/generate (also mounted at /api/generate)
///
/// Validates the posting, generates five questions and stores them as one
/// batch owned by the caller. Nothing is stored unless generation succeeds.
pub async fn handle_generate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    let Json(request) = body.map_err(|rejection| {
        AppError::from_json_rejection(rejection, "jobPosting", "Job posting is required")
    })?;

    let posting = validate_job_posting(&request.job_posting)
        .map_err(|issue| AppError::InvalidFields(vec![issue]))?;

    let questions = state.generator.generate_questions(posting).await?;
    let texts: Vec<String> = questions.into_iter().map(|q| q.text).collect();

    let records = state.store.create_batch(&texts, user_id).await?;
    info!("Saved {} questions for user {user_id}", records.len());

    let message = format!(
        "Successfully generated and saved {} questions",
        records.len()
    );
    Ok((
        StatusCode::CREATED,
        Json(GenerateResponse {
            questions: records.into_iter().map(QuestionDto::from).collect(),
            message,
        }),
    ))
}

/// GET /api/llm/status
pub async fn handle_llm_status(State(state): State<AppState>) -> Json<LlmStatusResponse> {
    Json(LlmStatusResponse {
        demo_mode: state.generator.is_demo_mode(),
        model: state.generator.model().map(str::to_string),
        cache: state.generator.cache_stats(),
    })
}

/// DELETE /api/llm/cache
///
/// Drops every cached model response and returns the (empty) cache stats.
pub async fn handle_clear_llm_cache(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Json<CacheStats> {
    state.generator.clear_cache();
    info!("LLM response cache cleared by user {user_id}");
    Json(state.generator.cache_stats())
}
