use study_core::model::{Topic, TopicId, TopicRecord};

use super::SqliteRepository;
use super::mapping::{conn, map_topic_row, uuid_text};
use crate::repository::{StorageError, TopicRepository};

const SELECT_TOPIC: &str = r"
    SELECT id, title, description, display_order, is_active, image_url, instructor,
           difficulty_level, duration_weeks, background_color, created_at
    FROM main_topics
";

#[async_trait::async_trait]
impl TopicRepository for SqliteRepository {
    async fn list_topics(&self) -> Result<Vec<TopicRecord>, StorageError> {
        let rows = sqlx::query(&format!("{SELECT_TOPIC} ORDER BY display_order ASC, id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        rows.iter().map(map_topic_row).collect()
    }

    async fn get_topic(&self, id: TopicId) -> Result<Option<TopicRecord>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_TOPIC} WHERE id = ?1"))
            .bind(uuid_text(id.value()))
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        row.as_ref().map(map_topic_row).transpose()
    }

    async fn upsert_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        let record = TopicRecord::from_topic(topic);
        sqlx::query(
            r"
            INSERT INTO main_topics (id, title, description, display_order, is_active, image_url,
                                     instructor, difficulty_level, duration_weeks, background_color,
                                     created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                display_order = excluded.display_order,
                is_active = excluded.is_active,
                image_url = excluded.image_url,
                instructor = excluded.instructor,
                difficulty_level = excluded.difficulty_level,
                duration_weeks = excluded.duration_weeks,
                background_color = excluded.background_color
            ",
        )
        .bind(uuid_text(record.id.value()))
        .bind(record.title)
        .bind(record.description)
        .bind(record.display_order)
        .bind(record.is_active)
        .bind(record.image_url)
        .bind(record.instructor)
        .bind(record.difficulty_level)
        .bind(record.duration_weeks)
        .bind(record.background_color)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
