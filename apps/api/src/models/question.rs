use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted interview question. `position` orders a generation batch (1..=5)
/// and is never reassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct QuestionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub position: i16,
    pub practiced: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// API view of a question. The owner id is never exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDto {
    pub id: Uuid,
    pub content: String,
    pub position: i16,
    pub practiced: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<QuestionRecord> for QuestionDto {
    fn from(row: QuestionRecord) -> Self {
        Self {
            id: row.id,
            content: row.content,
            position: row.position,
            practiced: row.practiced,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
