use study_core::model::{Category, CategoryRecord};

use super::SqliteRepository;
use super::mapping::{conn, map_category_row, uuid_text};
use crate::repository::{CategoryRepository, StorageError};

#[async_trait::async_trait]
impl CategoryRepository for SqliteRepository {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, main_topic_id, title, description, image_url, display_order, is_active
            FROM categories
            ORDER BY main_topic_id ASC, display_order ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;
        rows.iter().map(map_category_row).collect()
    }

    async fn upsert_category(&self, category: &Category) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO categories (id, main_topic_id, title, description, image_url, display_order, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                main_topic_id = excluded.main_topic_id,
                title = excluded.title,
                description = excluded.description,
                image_url = excluded.image_url,
                display_order = excluded.display_order,
                is_active = excluded.is_active
            ",
        )
        .bind(uuid_text(category.id().value()))
        .bind(uuid_text(category.topic_id().value()))
        .bind(category.title())
        .bind(category.description())
        .bind(category.image_url())
        .bind(category.display_order())
        .bind(category.is_active())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
