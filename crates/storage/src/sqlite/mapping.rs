use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use study_core::model::{
    BibleCharacter, CategoryId, CategoryRecord, CharacterId, CharacterProfile, ContentId,
    ContentRecord, ProgressRecord, Testament, TopicId, TopicRecord, UserId,
};
use uuid::Uuid;
use uuid::fmt::Hyphenated;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Ids are stored as hyphenated UUID text.
pub(crate) fn uuid_text(id: Uuid) -> Hyphenated {
    id.hyphenated()
}

fn get_uuid(row: &SqliteRow, column: &str) -> Result<Uuid, StorageError> {
    Ok(row.try_get::<Hyphenated, _>(column).map_err(ser)?.into_uuid())
}

fn get_opt_uuid(row: &SqliteRow, column: &str) -> Result<Option<Uuid>, StorageError> {
    Ok(row
        .try_get::<Option<Hyphenated>, _>(column)
        .map_err(ser)?
        .map(Hyphenated::into_uuid))
}

/// Encodes a string list as a JSON array; empty lists are stored as NULL.
pub(crate) fn list_to_json(values: &[String]) -> Result<Option<String>, StorageError> {
    if values.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(values).map(Some).map_err(ser)
}

fn list_from_json(raw: Option<String>) -> Result<Option<Vec<String>>, StorageError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| serde_json::from_str::<Vec<String>>(&s).map_err(ser))
        .transpose()
}

pub(crate) fn map_topic_row(row: &SqliteRow) -> Result<TopicRecord, StorageError> {
    Ok(TopicRecord {
        id: TopicId::new(get_uuid(row, "id")?),
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        display_order: row.try_get("display_order").map_err(ser)?,
        is_active: row.try_get("is_active").map_err(ser)?,
        image_url: row.try_get("image_url").map_err(ser)?,
        instructor: row.try_get("instructor").map_err(ser)?,
        difficulty_level: row.try_get("difficulty_level").map_err(ser)?,
        duration_weeks: row.try_get("duration_weeks").map_err(ser)?,
        background_color: row.try_get("background_color").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_category_row(row: &SqliteRow) -> Result<CategoryRecord, StorageError> {
    Ok(CategoryRecord {
        id: CategoryId::new(get_uuid(row, "id")?),
        topic_id: TopicId::new(get_uuid(row, "main_topic_id")?),
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        image_url: row.try_get("image_url").map_err(ser)?,
        display_order: row.try_get("display_order").map_err(ser)?,
        is_active: row.try_get("is_active").map_err(ser)?,
    })
}

pub(crate) fn map_content_row(row: &SqliteRow) -> Result<ContentRecord, StorageError> {
    Ok(ContentRecord {
        id: ContentId::new(get_uuid(row, "id")?),
        topic_id: TopicId::new(get_uuid(row, "main_topic_id")?),
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        content_type: row.try_get("content_type").map_err(ser)?,
        parent_type: row.try_get("parent_type").map_err(ser)?,
        parent_id: get_opt_uuid(row, "parent_id")?,
        display_order: row.try_get("display_order").map_err(ser)?,
        is_active: row.try_get("is_active").map_err(ser)?,
        body_content: row.try_get("body_content").map_err(ser)?,
        bible_references: list_from_json(row.try_get("bible_references").map_err(ser)?)?,
    })
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<ProgressRecord, StorageError> {
    Ok(ProgressRecord {
        user_id: UserId::new(get_uuid(row, "user_id")?),
        topic_id: TopicId::new(get_uuid(row, "main_topic_id")?),
        lesson_id: get_opt_uuid(row, "lesson_id")?.map(ContentId::new),
        completed_at: row.try_get("completed_at").map_err(ser)?,
        progress_percentage: row.try_get("progress_percentage").map_err(ser)?,
        notes: row.try_get("notes").map_err(ser)?,
    })
}

pub(crate) fn map_character_row(row: &SqliteRow) -> Result<BibleCharacter, StorageError> {
    let testament: String = row.try_get("testament").map_err(ser)?;
    BibleCharacter::new(
        CharacterId::new(get_uuid(row, "id")?),
        row.try_get::<String, _>("name").map_err(ser)?,
        Testament::parse(&testament).map_err(ser)?,
        CharacterProfile {
            category: row.try_get("category").map_err(ser)?,
            description: row.try_get("description").map_err(ser)?,
            story_summary: row.try_get("story_summary").map_err(ser)?,
            key_verses: list_from_json(row.try_get("key_verses").map_err(ser)?)?
                .unwrap_or_default(),
            image_url: row.try_get("image_url").map_err(ser)?,
        },
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_is_stored_as_null() {
        assert_eq!(list_to_json(&[]).unwrap(), None);
        assert_eq!(
            list_to_json(&["Genesis 1:1".to_owned()]).unwrap().as_deref(),
            Some(r#"["Genesis 1:1"]"#)
        );
    }

    #[test]
    fn list_column_rejects_malformed_json() {
        assert!(matches!(
            list_from_json(Some("not json".into())),
            Err(StorageError::Serialization(_))
        ));
        assert_eq!(list_from_json(Some("  ".into())).unwrap(), None);
    }
}
