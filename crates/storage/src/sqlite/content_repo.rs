use study_core::model::{ContentId, ContentNode, ContentRecord};

use super::SqliteRepository;
use super::mapping::{conn, list_to_json, map_content_row, uuid_text};
use crate::repository::{ContentRepository, StorageError};

const SELECT_CONTENT: &str = r"
    SELECT id, main_topic_id, title, description, content_type, parent_type, parent_id,
           display_order, is_active, body_content, bible_references
    FROM content
";

#[async_trait::async_trait]
impl ContentRepository for SqliteRepository {
    async fn list_contents(&self) -> Result<Vec<ContentRecord>, StorageError> {
        let rows = sqlx::query(&format!(
            "{SELECT_CONTENT} ORDER BY main_topic_id ASC, display_order ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;
        rows.iter().map(map_content_row).collect()
    }

    async fn get_content(&self, id: ContentId) -> Result<Option<ContentRecord>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_CONTENT} WHERE id = ?1"))
            .bind(uuid_text(id.value()))
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        row.as_ref().map(map_content_row).transpose()
    }

    async fn upsert_content(&self, node: &ContentNode) -> Result<(), StorageError> {
        let parent = node.parent();
        sqlx::query(
            r"
            INSERT INTO content (id, main_topic_id, title, description, content_type, parent_type,
                                 parent_id, display_order, is_active, body_content, bible_references)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                main_topic_id = excluded.main_topic_id,
                title = excluded.title,
                description = excluded.description,
                content_type = excluded.content_type,
                parent_type = excluded.parent_type,
                parent_id = excluded.parent_id,
                display_order = excluded.display_order,
                is_active = excluded.is_active,
                body_content = excluded.body_content,
                bible_references = excluded.bible_references
            ",
        )
        .bind(uuid_text(node.id().value()))
        .bind(uuid_text(node.topic_id().value()))
        .bind(node.title())
        .bind(node.description())
        .bind(node.kind().as_str())
        .bind(parent.parent_type())
        .bind(uuid_text(parent.raw_id()))
        .bind(node.display_order())
        .bind(node.is_active())
        .bind(node.body())
        .bind(list_to_json(node.bible_references())?)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
