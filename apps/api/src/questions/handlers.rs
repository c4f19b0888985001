//! Axum route handlers for the Questions API.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::{AppError, FieldError};
use crate::models::question::QuestionDto;
use crate::questions::store::{ListFilter, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Raw query string values; parsed by hand so bad values become field errors.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub practiced: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListQuery {
    pub fn into_filter(self) -> Result<ListFilter, AppError> {
        let mut issues = Vec::new();

        let practiced = match self.practiced.as_deref() {
            None => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(_) => {
                issues.push(FieldError::new("practiced", "Expected true or false"));
                None
            }
        };

        let limit = match self.limit.as_deref().map(str::parse::<i64>) {
            None => DEFAULT_LIST_LIMIT,
            Some(Ok(n)) if (1..=MAX_LIST_LIMIT).contains(&n) => n,
            Some(_) => {
                issues.push(FieldError::new(
                    "limit",
                    format!("Limit must be an integer between 1 and {MAX_LIST_LIMIT}"),
                ));
                DEFAULT_LIST_LIMIT
            }
        };

        let offset = match self.offset.as_deref().map(str::parse::<i64>) {
            None => 0,
            Some(Ok(n)) if n >= 0 => n,
            Some(_) => {
                issues.push(FieldError::new(
                    "offset",
                    "Offset must be a non-negative integer",
                ));
                0
            }
        };

        if !issues.is_empty() {
            return Err(AppError::InvalidFields(issues));
        }
        Ok(ListFilter {
            practiced,
            limit,
            offset,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub questions: Vec<QuestionDto>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub question: QuestionDto,
}

#[derive(Debug, Deserialize)]
pub struct PracticedUpdate {
    pub practiced: bool,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub question: QuestionDto,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub deleted: u64,
}

fn parse_question_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid question ID format".to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/questions
pub async fn handle_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let filter = query.into_filter()?;
    let page = state.store.list_by_owner(user_id, filter).await?;

    Ok(Json(ListResponse {
        questions: page.records.into_iter().map(QuestionDto::from).collect(),
        pagination: Pagination {
            total: page.total,
            limit: filter.limit,
            offset: filter.offset,
        },
    }))
}

/// GET /api/questions/:id
pub async fn handle_get(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<QuestionResponse>, AppError> {
    let id = parse_question_id(&id)?;
    let record = state.store.get_by_id(id, user_id).await?;
    Ok(Json(QuestionResponse {
        question: record.into(),
    }))
}

/// PATCH /api/questions/:id
///
/// Body: `{"practiced": bool}`. Only the owner can update a question;
/// anyone else gets the same 404 as for a missing id.
pub async fn handle_update_practiced(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<PracticedUpdate>, JsonRejection>,
) -> Result<Json<UpdateResponse>, AppError> {
    let id = parse_question_id(&id)?;
    let Json(update) = body.map_err(|rejection| {
        AppError::from_json_rejection(rejection, "practiced", "Expected boolean")
    })?;

    let record = state
        .store
        .update_practiced(id, update.practiced, user_id)
        .await?;

    let status = if update.practiced {
        "practiced"
    } else {
        "not practiced"
    };
    Ok(Json(UpdateResponse {
        question: record.into(),
        message: format!("Question practice status updated to {status}"),
    }))
}

/// DELETE /api/questions/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_question_id(&id)?;
    state.store.delete(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/questions
pub async fn handle_clear(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ClearResponse>, AppError> {
    let deleted = state.store.delete_all(user_id).await?;
    tracing::info!("Cleared {deleted} questions for user {user_id}");
    Ok(Json(ClearResponse { deleted }))
}
