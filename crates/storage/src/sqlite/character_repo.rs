use study_core::model::BibleCharacter;

use super::SqliteRepository;
use super::mapping::{conn, list_to_json, map_character_row, uuid_text};
use crate::repository::{CharacterRepository, StorageError};

#[async_trait::async_trait]
impl CharacterRepository for SqliteRepository {
    async fn list_characters(&self) -> Result<Vec<BibleCharacter>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, testament, category, description, story_summary, key_verses,
                   image_url, created_at
            FROM bible_characters
            ORDER BY name ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;
        rows.iter().map(map_character_row).collect()
    }

    async fn upsert_character(&self, character: &BibleCharacter) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO bible_characters (id, name, testament, category, description, story_summary,
                                          key_verses, image_url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                testament = excluded.testament,
                category = excluded.category,
                description = excluded.description,
                story_summary = excluded.story_summary,
                key_verses = excluded.key_verses,
                image_url = excluded.image_url
            ",
        )
        .bind(uuid_text(character.id().value()))
        .bind(character.name())
        .bind(character.testament().as_str())
        .bind(character.category())
        .bind(character.description())
        .bind(character.story_summary())
        .bind(list_to_json(character.key_verses())?)
        .bind(character.image_url())
        .bind(character.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
