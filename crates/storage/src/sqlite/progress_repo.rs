use async_trait::async_trait;
use chrono::Utc;
use prep_core::model::SavedProgress;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser, test_index_to_i64};
use crate::repository::{
    ExamProgressRepository, ExamSlot, StorageError, decode_progress, encode_progress,
};

#[async_trait]
impl ExamProgressRepository for SqliteRepository {
    async fn save_progress(
        &self,
        slot: &ExamSlot,
        progress: &SavedProgress,
    ) -> Result<(), StorageError> {
        let payload = encode_progress(progress)?;
        sqlx::query(
            r"
                INSERT INTO exam_progress (namespace, subject, test_index, payload, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(namespace, subject, test_index) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(slot.namespace.storage_key())
        .bind(slot.subject.slug())
        .bind(test_index_to_i64(slot.test_index))
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn load_progress(&self, slot: &ExamSlot) -> Result<Option<SavedProgress>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT payload
                FROM exam_progress
                WHERE namespace = ?1 AND subject = ?2 AND test_index = ?3
            ",
        )
        .bind(slot.namespace.storage_key())
        .bind(slot.subject.slug())
        .bind(test_index_to_i64(slot.test_index))
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload: String = row.try_get("payload").map_err(ser)?;
        Ok(decode_progress(slot, &payload))
    }

    async fn clear_progress(&self, slot: &ExamSlot) -> Result<(), StorageError> {
        sqlx::query(
            r"
                DELETE FROM exam_progress
                WHERE namespace = ?1 AND subject = ?2 AND test_index = ?3
            ",
        )
        .bind(slot.namespace.storage_key())
        .bind(slot.subject.slug())
        .bind(test_index_to_i64(slot.test_index))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
