//! Validation and scoping of raw rows before tree assembly.
//!
//! The store hands over whole tables; ingestion keeps the active rows of
//! one topic, turns them into domain entities and refuses anything that
//! would make the resulting tree wrong rather than merely smaller.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use uuid::Uuid;

use crate::model::{
    Category, CategoryId, CategoryRecord, ContentId, ContentKind, ContentNode, ContentRecord,
    Diagnostic, IgnoredMarkReason, ParentRef, ProgressMark, ProgressRecord, RecordError, Topic,
    TopicId, TopicRecord, UserId,
};
use crate::tree::ContentTree;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    #[error("no active topic with id {0}")]
    TopicNotFound(TopicId),

    #[error("invalid {entity} row {id}: {source}")]
    InvalidRow {
        entity: &'static str,
        id: Uuid,
        source: RecordError,
    },

    #[error("duplicate {entity} id {id}")]
    DuplicateId { entity: &'static str, id: Uuid },

    #[error("content {content_id} in topic {topic_id} has its parent in topic {parent_topic_id}")]
    CrossTopicParent {
        content_id: ContentId,
        topic_id: TopicId,
        parent_topic_id: TopicId,
    },

    #[error("progress mark targets subcategory {0}, not a lesson")]
    MarkOnSubcategory(ContentId),
}

//
// ─── OUTPUT ────────────────────────────────────────────────────────────────────
//

/// Active, validated rows of a single topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRows {
    topic: Topic,
    categories: Vec<Category>,
    contents: Vec<ContentNode>,
}

impl TopicRows {
    #[must_use]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn contents(&self) -> &[ContentNode] {
        &self.contents
    }

    #[must_use]
    pub fn into_parts(self) -> (Topic, Vec<Category>, Vec<ContentNode>) {
        (self.topic, self.categories, self.contents)
    }
}

/// A user's marks for one topic, restricted to known lessons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMarks {
    pub user_id: UserId,
    pub topic_id: TopicId,
    pub marks: Vec<ProgressMark>,
    pub diagnostics: Vec<Diagnostic>,
}

//
// ─── INGESTION ─────────────────────────────────────────────────────────────────
//

/// Scopes the given tables to the active rows of `topic_id`.
///
/// Rows belonging to other topics are only consulted to catch parent
/// references that cross a topic boundary.
///
/// # Errors
///
/// Returns `IngestError::TopicNotFound` when there is no active topic row,
/// `IngestError::InvalidRow` for malformed in-scope rows,
/// `IngestError::DuplicateId` when an id repeats and
/// `IngestError::CrossTopicParent` for parents owned by another topic.
pub fn ingest(
    topic_id: TopicId,
    topics: &[TopicRecord],
    categories: &[CategoryRecord],
    contents: &[ContentRecord],
) -> Result<TopicRows, IngestError> {
    let topic = topics
        .iter()
        .find(|t| t.id == topic_id && t.is_active())
        .cloned()
        .ok_or(IngestError::TopicNotFound(topic_id))?
        .into_topic()
        .map_err(|source| IngestError::InvalidRow {
            entity: "topic",
            id: topic_id.value(),
            source,
        })?;

    // In-scope rows go in last so an id shared with another topic resolves here.
    let category_owner: HashMap<CategoryId, TopicId> = categories
        .iter()
        .filter(|c| c.topic_id != topic_id)
        .chain(categories.iter().filter(|c| c.topic_id == topic_id))
        .map(|c| (c.id, c.topic_id))
        .collect();
    let content_owner: HashMap<ContentId, TopicId> = contents
        .iter()
        .filter(|c| c.topic_id != topic_id)
        .chain(contents.iter().filter(|c| c.topic_id == topic_id))
        .map(|c| (c.id, c.topic_id))
        .collect();

    let mut seen = HashSet::new();
    let mut kept_categories = Vec::new();
    for record in categories
        .iter()
        .filter(|c| c.topic_id == topic_id && c.is_active())
    {
        if !seen.insert(record.id.value()) {
            return Err(IngestError::DuplicateId {
                entity: "category",
                id: record.id.value(),
            });
        }
        let category = record
            .clone()
            .into_category()
            .map_err(|source| IngestError::InvalidRow {
                entity: "category",
                id: record.id.value(),
                source,
            })?;
        kept_categories.push(category);
    }

    let mut seen = HashSet::new();
    let mut kept_contents = Vec::new();
    for record in contents
        .iter()
        .filter(|c| c.topic_id == topic_id && c.is_active())
    {
        if !seen.insert(record.id) {
            return Err(IngestError::DuplicateId {
                entity: "content",
                id: record.id.value(),
            });
        }
        let node = record
            .clone()
            .into_node()
            .map_err(|source| IngestError::InvalidRow {
                entity: "content",
                id: record.id.value(),
                source,
            })?;

        let parent_topic = match node.parent() {
            ParentRef::Category(id) => category_owner.get(&id),
            ParentRef::Content(id) => content_owner.get(&id),
        };
        if let Some(&parent_topic_id) = parent_topic {
            if parent_topic_id != topic_id {
                return Err(IngestError::CrossTopicParent {
                    content_id: node.id(),
                    topic_id,
                    parent_topic_id,
                });
            }
        }
        kept_contents.push(node);
    }

    Ok(TopicRows {
        topic,
        categories: kept_categories,
        contents: kept_contents,
    })
}

/// Keeps the marks of `user_id` that belong to the topic of `tree`.
///
/// Marks naming no lesson, or a lesson that is not part of the assembled
/// tree, are dropped and reported as diagnostics.
///
/// # Errors
///
/// Returns `IngestError::MarkOnSubcategory` if a mark names a subcategory,
/// or `IngestError::InvalidRow` for a malformed mark.
pub fn ingest_progress(
    tree: &ContentTree,
    user_id: UserId,
    marks: &[ProgressRecord],
) -> Result<UserMarks, IngestError> {
    let topic_id = tree.topic().id();

    let mut kept = Vec::new();
    let mut diagnostics = Vec::new();
    for record in marks
        .iter()
        .filter(|m| m.user_id == user_id && m.topic_id == topic_id)
    {
        let Some(lesson_id) = record.lesson_id else {
            diagnostics.push(Diagnostic::IgnoredProgressMark {
                lesson_id: None,
                reason: IgnoredMarkReason::NoLesson,
            });
            continue;
        };

        match tree.find(lesson_id).map(|b| b.node().kind()) {
            None => diagnostics.push(Diagnostic::IgnoredProgressMark {
                lesson_id: Some(lesson_id),
                reason: IgnoredMarkReason::UnknownLesson,
            }),
            Some(ContentKind::Subcategory) => {
                return Err(IngestError::MarkOnSubcategory(lesson_id));
            }
            Some(ContentKind::Lesson) => {
                let mark =
                    record
                        .clone()
                        .into_mark()
                        .map_err(|source| IngestError::InvalidRow {
                            entity: "progress",
                            id: lesson_id.value(),
                            source,
                        })?;
                kept.push(mark);
            }
        }
    }

    Ok(UserMarks {
        user_id,
        topic_id,
        marks: kept,
        diagnostics,
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;
    use crate::time::fixed_now;

    fn topic(id: u128, active: Option<bool>) -> TopicRecord {
        TopicRecord {
            id: TopicId::from_u128(id),
            title: Some(format!("Topic {id}")),
            description: None,
            display_order: Some(0),
            is_active: active,
            image_url: None,
            instructor: None,
            difficulty_level: None,
            duration_weeks: None,
            background_color: None,
            created_at: fixed_now(),
        }
    }

    fn category(id: u128, topic: u128, active: bool) -> CategoryRecord {
        CategoryRecord {
            id: CategoryId::from_u128(id),
            topic_id: TopicId::from_u128(topic),
            title: Some(format!("Category {id}")),
            description: None,
            image_url: None,
            display_order: Some(0),
            is_active: Some(active),
        }
    }

    fn lesson(id: u128, topic: u128, parent_type: &str, parent: u128) -> ContentRecord {
        ContentRecord {
            id: ContentId::from_u128(id),
            topic_id: TopicId::from_u128(topic),
            title: Some(format!("Lesson {id}")),
            description: None,
            content_type: Some("lesson".into()),
            parent_type: Some(parent_type.into()),
            parent_id: Some(Uuid::from_u128(parent)),
            display_order: Some(0),
            is_active: Some(true),
            body_content: None,
            bible_references: None,
        }
    }

    #[test]
    fn missing_or_inactive_topic_is_rejected() {
        let topics = [topic(1, Some(false)), topic(2, None)];
        for id in [1, 2, 3] {
            let err = ingest(TopicId::from_u128(id), &topics, &[], &[]).unwrap_err();
            assert_eq!(err, IngestError::TopicNotFound(TopicId::from_u128(id)));
        }
    }

    #[test]
    fn keeps_only_active_rows_of_target_topic() {
        let topics = [topic(1, Some(true)), topic(2, Some(true))];
        let categories = [
            category(10, 1, true),
            category(11, 1, false),
            category(20, 2, true),
        ];
        let mut inactive = lesson(101, 1, "category", 10);
        inactive.is_active = Some(false);
        let contents = [lesson(100, 1, "category", 10), inactive, lesson(200, 2, "category", 20)];

        let rows = ingest(TopicId::from_u128(1), &topics, &categories, &contents).unwrap();
        assert_eq!(rows.topic().title(), "Topic 1");
        let category_ids: Vec<_> = rows.categories().iter().map(Category::id).collect();
        assert_eq!(category_ids, [CategoryId::from_u128(10)]);
        let content_ids: Vec<_> = rows.contents().iter().map(ContentNode::id).collect();
        assert_eq!(content_ids, [ContentId::from_u128(100)]);
    }

    #[test]
    fn malformed_row_is_a_validation_error() {
        let topics = [topic(1, Some(true))];
        let mut broken = lesson(100, 1, "category", 10);
        broken.title = None;

        let err = ingest(
            TopicId::from_u128(1),
            &topics,
            &[category(10, 1, true)],
            &[broken],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            IngestError::InvalidRow {
                entity: "content",
                source: RecordError::MissingField { field: "title", .. },
                ..
            }
        ));
    }

    #[test]
    fn malformed_rows_outside_scope_are_ignored() {
        let topics = [topic(1, Some(true))];
        let mut broken = lesson(100, 1, "category", 10);
        broken.content_type = Some("video".into());
        broken.is_active = Some(false);

        let rows = ingest(
            TopicId::from_u128(1),
            &topics,
            &[category(10, 1, true)],
            &[broken],
        )
        .unwrap();
        assert!(rows.contents().is_empty());
    }

    #[test]
    fn cross_topic_parent_is_rejected() {
        let topics = [topic(1, Some(true)), topic(2, Some(true))];
        let categories = [category(10, 1, true), category(20, 2, true)];
        let contents = [lesson(100, 1, "category", 20)];

        let err = ingest(TopicId::from_u128(1), &topics, &categories, &contents).unwrap_err();
        assert_eq!(
            err,
            IngestError::CrossTopicParent {
                content_id: ContentId::from_u128(100),
                topic_id: TopicId::from_u128(1),
                parent_topic_id: TopicId::from_u128(2),
            }
        );
    }

    #[test]
    fn parent_id_shared_with_another_topic_resolves_in_scope() {
        let topics = [topic(1, Some(true)), topic(2, Some(true))];
        let categories = [category(10, 1, true), category(10, 2, true)];
        let contents = [
            lesson(100, 1, "category", 10),
            lesson(101, 1, "content", 100),
            lesson(100, 2, "category", 10),
        ];

        let rows = ingest(TopicId::from_u128(1), &topics, &categories, &contents).unwrap();
        let content_ids: Vec<_> = rows.contents().iter().map(ContentNode::id).collect();
        assert_eq!(content_ids, [ContentId::from_u128(100), ContentId::from_u128(101)]);
    }

    #[test]
    fn duplicate_content_ids_are_rejected() {
        let topics = [topic(1, Some(true))];
        let contents = [lesson(100, 1, "category", 10), lesson(100, 1, "category", 10)];
        let err = ingest(
            TopicId::from_u128(1),
            &topics,
            &[category(10, 1, true)],
            &contents,
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::DuplicateId { entity: "content", .. }));
    }

    fn mark(user: u128, topic: u128, lesson: Option<u128>) -> ProgressRecord {
        ProgressRecord {
            user_id: UserId::from_u128(user),
            topic_id: TopicId::from_u128(topic),
            lesson_id: lesson.map(ContentId::from_u128),
            completed_at: Some(fixed_now()),
            progress_percentage: Some(100),
            notes: None,
        }
    }

    #[test]
    fn progress_keeps_own_marks_and_reports_unknown_lessons() {
        let topics = [topic(1, Some(true))];
        let rows = ingest(
            TopicId::from_u128(1),
            &topics,
            &[category(10, 1, true)],
            &[lesson(100, 1, "category", 10), lesson(101, 1, "category", 55)],
        )
        .unwrap();
        let tree = TreeBuilder::build(rows).unwrap().tree;

        let marks = [
            mark(7, 1, Some(100)),
            mark(7, 1, Some(999)),
            mark(7, 1, Some(101)),
            mark(7, 1, None),
            mark(8, 1, Some(100)),
            mark(7, 2, Some(100)),
        ];
        let user = ingest_progress(&tree, UserId::from_u128(7), &marks).unwrap();

        assert_eq!(user.marks.len(), 1);
        assert_eq!(user.marks[0].lesson_id, ContentId::from_u128(100));
        assert_eq!(
            user.diagnostics,
            vec![
                Diagnostic::IgnoredProgressMark {
                    lesson_id: Some(ContentId::from_u128(999)),
                    reason: IgnoredMarkReason::UnknownLesson,
                },
                Diagnostic::IgnoredProgressMark {
                    lesson_id: Some(ContentId::from_u128(101)),
                    reason: IgnoredMarkReason::UnknownLesson,
                },
                Diagnostic::IgnoredProgressMark {
                    lesson_id: None,
                    reason: IgnoredMarkReason::NoLesson,
                },
            ]
        );
    }

    #[test]
    fn mark_on_subcategory_is_rejected() {
        let topics = [topic(1, Some(true))];
        let mut folder = lesson(100, 1, "category", 10);
        folder.content_type = Some("subcategory".into());
        let rows = ingest(
            TopicId::from_u128(1),
            &topics,
            &[category(10, 1, true)],
            &[folder],
        )
        .unwrap();
        let tree = TreeBuilder::build(rows).unwrap().tree;

        let err = ingest_progress(&tree, UserId::from_u128(7), &[mark(7, 1, Some(100))]).unwrap_err();
        assert_eq!(err, IngestError::MarkOnSubcategory(ContentId::from_u128(100)));
    }
}
