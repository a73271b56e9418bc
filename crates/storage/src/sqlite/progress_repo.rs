use study_core::model::{ProgressMark, ProgressRecord, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_progress_row, uuid_text};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn list_progress(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, main_topic_id, lesson_id, completed_at, progress_percentage, notes
            FROM user_progress
            WHERE user_id = ?1
            ORDER BY main_topic_id ASC, lesson_id ASC
            ",
        )
        .bind(uuid_text(user_id.value()))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;
        rows.iter().map(map_progress_row).collect()
    }

    async fn upsert_progress(&self, mark: &ProgressMark) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_progress (user_id, main_topic_id, lesson_id, completed_at, progress_percentage, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(user_id, lesson_id) DO UPDATE SET
                main_topic_id = excluded.main_topic_id,
                completed_at = excluded.completed_at,
                progress_percentage = excluded.progress_percentage,
                notes = excluded.notes
            ",
        )
        .bind(uuid_text(mark.user_id.value()))
        .bind(uuid_text(mark.topic_id.value()))
        .bind(uuid_text(mark.lesson_id.value()))
        .bind(mark.completed_at)
        .bind(mark.percentage.map(i32::from))
        .bind(mark.notes.as_deref())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
