//! In-process `QuestionStore`, used when no database is configured and in tests.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::question::QuestionRecord;
use crate::questions::store::{ListFilter, ListPage, QuestionStore, StoreError};

struct StoredQuestion {
    batch: u64,
    record: QuestionRecord,
}

#[derive(Default)]
struct Inner {
    next_batch: u64,
    rows: Vec<StoredQuestion>,
}

#[derive(Default)]
pub struct InMemoryQuestionStore {
    inner: RwLock<Inner>,
}

impl InMemoryQuestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl QuestionStore for InMemoryQuestionStore {
    async fn create_batch(
        &self,
        questions: &[String],
        owner: Uuid,
    ) -> Result<Vec<QuestionRecord>, StoreError> {
        let now = Utc::now();
        let records: Vec<QuestionRecord> = questions
            .iter()
            .enumerate()
            .map(|(index, content)| QuestionRecord {
                id: Uuid::new_v4(),
                user_id: owner,
                content: content.trim().to_string(),
                position: (index + 1) as i16,
                practiced: false,
                created_at: now,
                updated_at: now,
            })
            .collect();

        // One lock acquisition: the whole batch becomes visible at once.
        let mut inner = self.write();
        inner.next_batch += 1;
        let batch = inner.next_batch;
        inner.rows.extend(records.iter().cloned().map(|record| StoredQuestion {
            batch,
            record,
        }));
        Ok(records)
    }

    async fn list_by_owner(
        &self,
        owner: Uuid,
        filter: ListFilter,
    ) -> Result<ListPage, StoreError> {
        let inner = self.read();
        let mut matching: Vec<&StoredQuestion> = inner
            .rows
            .iter()
            .filter(|q| q.record.user_id == owner)
            .filter(|q| filter.practiced.map_or(true, |p| q.record.practiced == p))
            .collect();

        matching.sort_by(|a, b| {
            b.batch
                .cmp(&a.batch)
                .then(a.record.position.cmp(&b.record.position))
        });

        let total = matching.len() as i64;
        let records = matching
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .map(|q| q.record.clone())
            .collect();

        Ok(ListPage { records, total })
    }

    async fn get_by_id(&self, id: Uuid, owner: Uuid) -> Result<QuestionRecord, StoreError> {
        self.read()
            .rows
            .iter()
            .find(|q| q.record.id == id && q.record.user_id == owner)
            .map(|q| q.record.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn update_practiced(
        &self,
        id: Uuid,
        practiced: bool,
        owner: Uuid,
    ) -> Result<QuestionRecord, StoreError> {
        let mut inner = self.write();
        let stored = inner
            .rows
            .iter_mut()
            .find(|q| q.record.id == id && q.record.user_id == owner)
            .ok_or(StoreError::NotFound)?;
        stored.record.practiced = practiced;
        stored.record.updated_at = Utc::now();
        Ok(stored.record.clone())
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), StoreError> {
        let mut inner = self.write();
        let before = inner.rows.len();
        inner
            .rows
            .retain(|q| !(q.record.id == id && q.record.user_id == owner));
        if inner.rows.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_all(&self, owner: Uuid) -> Result<u64, StoreError> {
        let mut inner = self.write();
        let before = inner.rows.len();
        inner.rows.retain(|q| q.record.user_id != owner);
        Ok((before - inner.rows.len()) as u64)
    }
}
