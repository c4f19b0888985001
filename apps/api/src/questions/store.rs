//! Question Store: owner-scoped persistence for generated questions.
//!
//! `AppState` holds an `Arc<dyn QuestionStore>`: `PgQuestionStore` when a
//! database is configured, `InMemoryQuestionStore` otherwise.
//!
//! Every operation takes the requesting user's id. A row that does not exist
//! and a row owned by someone else are indistinguishable to the caller.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::question::QuestionRecord;

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 100;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Question not found or access denied")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Inconsistent store result: {0}")]
    Inconsistent(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    pub practiced: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            practiced: None,
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListPage {
    pub records: Vec<QuestionRecord>,
    /// All rows matching the filter, ignoring limit/offset.
    pub total: i64,
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Inserts all questions atomically with positions 1..=n in the given order.
    async fn create_batch(
        &self,
        questions: &[String],
        owner: Uuid,
    ) -> Result<Vec<QuestionRecord>, StoreError>;

    /// Newest batches first, batch order (position) within each batch.
    async fn list_by_owner(&self, owner: Uuid, filter: ListFilter)
        -> Result<ListPage, StoreError>;

    async fn get_by_id(&self, id: Uuid, owner: Uuid) -> Result<QuestionRecord, StoreError>;

    async fn update_practiced(
        &self,
        id: Uuid,
        practiced: bool,
        owner: Uuid,
    ) -> Result<QuestionRecord, StoreError>;

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), StoreError>;

    /// Removes every question owned by `owner`; returns how many were removed.
    async fn delete_all(&self, owner: Uuid) -> Result<u64, StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

const CREATE_QUESTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS questions (
    id          UUID PRIMARY KEY,
    user_id     UUID NOT NULL,
    content     TEXT NOT NULL,
    position    SMALLINT NOT NULL CHECK (position BETWEEN 1 AND 5),
    practiced   BOOLEAN NOT NULL DEFAULT FALSE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_QUESTIONS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_questions_user_created
    ON questions (user_id, created_at DESC)
"#;

#[derive(Clone)]
pub struct PgQuestionStore {
    pool: PgPool,
}

impl PgQuestionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the questions table and its index if missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_QUESTIONS_TABLE)
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_QUESTIONS_INDEX)
            .execute(&self.pool)
            .await?;
        info!("questions schema ensured");
        Ok(())
    }
}

#[async_trait]
impl QuestionStore for PgQuestionStore {
    async fn create_batch(
        &self,
        questions: &[String],
        owner: Uuid,
    ) -> Result<Vec<QuestionRecord>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut records = Vec::with_capacity(questions.len());

        for (index, content) in questions.iter().enumerate() {
            let record = sqlx::query_as::<_, QuestionRecord>(
                r#"
                INSERT INTO questions (id, user_id, content, position, practiced)
                VALUES ($1, $2, $3, $4, FALSE)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(owner)
            .bind(content.trim())
            .bind((index + 1) as i16)
            .fetch_one(&mut *tx)
            .await?;
            records.push(record);
        }

        if records.len() != questions.len() {
            // Dropping the transaction rolls it back.
            return Err(StoreError::Inconsistent(format!(
                "expected {} rows, inserted {}",
                questions.len(),
                records.len()
            )));
        }

        tx.commit().await?;
        info!("Inserted {} questions for user {owner}", records.len());
        Ok(records)
    }

    async fn list_by_owner(
        &self,
        owner: Uuid,
        filter: ListFilter,
    ) -> Result<ListPage, StoreError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM questions
            WHERE user_id = $1 AND ($2::boolean IS NULL OR practiced = $2)
            "#,
        )
        .bind(owner)
        .bind(filter.practiced)
        .fetch_one(&self.pool)
        .await?;

        let records = sqlx::query_as::<_, QuestionRecord>(
            r#"
            SELECT * FROM questions
            WHERE user_id = $1 AND ($2::boolean IS NULL OR practiced = $2)
            ORDER BY created_at DESC, position ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(owner)
        .bind(filter.practiced)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(ListPage { records, total })
    }

    async fn get_by_id(&self, id: Uuid, owner: Uuid) -> Result<QuestionRecord, StoreError> {
        sqlx::query_as::<_, QuestionRecord>(
            "SELECT * FROM questions WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn update_practiced(
        &self,
        id: Uuid,
        practiced: bool,
        owner: Uuid,
    ) -> Result<QuestionRecord, StoreError> {
        sqlx::query_as::<_, QuestionRecord>(
            r#"
            UPDATE questions
            SET practiced = $1, updated_at = now()
            WHERE id = $2 AND user_id = $3
            RETURNING *
            "#,
        )
        .bind(practiced)
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_all(&self, owner: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM questions WHERE user_id = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
