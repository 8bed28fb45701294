use async_trait::async_trait;
use prep_core::model::{AttemptId, CompletedAttempt, Namespace};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    conn, encode_answers, encode_marked, map_attempt_row, reason_to_str, test_index_to_i64,
};
use crate::repository::{AttemptRepository, ExamSlot, StorageError};

const ATTEMPT_COLUMNS: &str = r"
    id, subject, test_index, correct_count, total_count, scaled_score,
    answers, marked, completed_at, duration_secs, reason
";

/// Rows that no longer decode are logged and left out of the listing.
fn map_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Vec<CompletedAttempt> {
    rows.iter()
        .filter_map(|row| match map_attempt_row(row) {
            Ok(attempt) => Some(attempt),
            Err(err) => {
                let id = row.try_get::<i64, _>("id").unwrap_or_default();
                tracing::warn!(attempt_id = id, error = %err, "skipping unreadable attempt row");
                None
            }
        })
        .collect()
}

#[async_trait]
impl AttemptRepository for SqliteRepository {
    async fn append_attempt(
        &self,
        namespace: &Namespace,
        attempt: &CompletedAttempt,
    ) -> Result<AttemptId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO attempts (
                    namespace, subject, test_index, correct_count, total_count,
                    scaled_score, answers, marked, completed_at, duration_secs, reason
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ",
        )
        .bind(namespace.storage_key())
        .bind(attempt.subject().slug())
        .bind(test_index_to_i64(attempt.test_index()))
        .bind(i64::from(attempt.correct_count()))
        .bind(i64::from(attempt.total_count()))
        .bind(i64::from(attempt.scaled_score()))
        .bind(encode_answers(attempt.answers())?)
        .bind(encode_marked(attempt.marked())?)
        .bind(attempt.completed_at())
        .bind(i64::from(attempt.duration_secs()))
        .bind(reason_to_str(attempt.reason()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(AttemptId::new(res.last_insert_rowid()))
    }

    async fn list_attempts(&self, slot: &ExamSlot) -> Result<Vec<CompletedAttempt>, StorageError> {
        let sql = format!(
            "SELECT {ATTEMPT_COLUMNS} FROM attempts \
             WHERE namespace = ?1 AND subject = ?2 AND test_index = ?3 \
             ORDER BY id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(slot.namespace.storage_key())
            .bind(slot.subject.slug())
            .bind(test_index_to_i64(slot.test_index))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        Ok(map_rows(&rows))
    }

    async fn list_namespace_attempts(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<CompletedAttempt>, StorageError> {
        let sql = format!("SELECT {ATTEMPT_COLUMNS} FROM attempts WHERE namespace = ?1 ORDER BY id ASC");
        let rows = sqlx::query(&sql)
            .bind(namespace.storage_key())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        Ok(map_rows(&rows))
    }

    async fn get_attempt(
        &self,
        namespace: &Namespace,
        id: AttemptId,
    ) -> Result<CompletedAttempt, StorageError> {
        let sql = format!("SELECT {ATTEMPT_COLUMNS} FROM attempts WHERE namespace = ?1 AND id = ?2");
        let row = sqlx::query(&sql)
            .bind(namespace.storage_key())
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;
        map_attempt_row(&row)
    }

    async fn clear_attempts(&self, slot: &ExamSlot) -> Result<u64, StorageError> {
        let res = sqlx::query(
            r"
                DELETE FROM attempts
                WHERE namespace = ?1 AND subject = ?2 AND test_index = ?3
            ",
        )
        .bind(slot.namespace.storage_key())
        .bind(slot.subject.slug())
        .bind(test_index_to_i64(slot.test_index))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(res.rows_affected())
    }
}
