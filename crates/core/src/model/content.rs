use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::ids::{CategoryId, ContentId, TopicId};
use crate::model::record::RecordError;
use crate::model::topic::{normalize_optional, required_text};

//
// ─── KIND & PARENT ─────────────────────────────────────────────────────────────
//

/// What a content node is: something to study, or a folder of further nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Lesson,
    Subcategory,
}

impl ContentKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Lesson => "lesson",
            ContentKind::Subcategory => "subcategory",
        }
    }

    /// # Errors
    ///
    /// Returns `RecordError::UnknownContentKind` for unrecognised values.
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        match raw.trim() {
            "lesson" => Ok(Self::Lesson),
            "subcategory" => Ok(Self::Subcategory),
            _ => Err(RecordError::UnknownContentKind(raw.to_owned())),
        }
    }
}

/// Where a content node hangs in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "parent_type", content = "parent_id", rename_all = "lowercase")]
pub enum ParentRef {
    Category(CategoryId),
    Content(ContentId),
}

impl ParentRef {
    /// Combines the stored `parent_type` discriminator with its id.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::UnknownParentType` if the discriminator is not
    /// `category` or `content`.
    pub fn from_parts(parent_type: &str, parent_id: Uuid) -> Result<Self, RecordError> {
        match parent_type.trim() {
            "category" => Ok(Self::Category(CategoryId::new(parent_id))),
            "content" => Ok(Self::Content(ContentId::new(parent_id))),
            other => Err(RecordError::UnknownParentType(other.to_owned())),
        }
    }

    #[must_use]
    pub fn parent_type(self) -> &'static str {
        match self {
            ParentRef::Category(_) => "category",
            ParentRef::Content(_) => "content",
        }
    }

    #[must_use]
    pub fn raw_id(self) -> Uuid {
        match self {
            ParentRef::Category(id) => id.value(),
            ParentRef::Content(id) => id.value(),
        }
    }
}

//
// ─── CONTENT NODE ──────────────────────────────────────────────────────────────
//

/// A lesson or subcategory; the recursive unit of the tree below a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    id: ContentId,
    topic_id: TopicId,
    kind: ContentKind,
    parent: ParentRef,
    title: String,
    description: Option<String>,
    display_order: i32,
    is_active: bool,
    body: Option<String>,
    bible_references: Vec<String>,
}

impl ContentNode {
    /// Creates a new content node.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::MissingField` if the title is blank.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ContentId,
        topic_id: TopicId,
        kind: ContentKind,
        parent: ParentRef,
        title: impl Into<String>,
        description: Option<String>,
        display_order: i32,
        is_active: bool,
    ) -> Result<Self, RecordError> {
        Ok(Self {
            id,
            topic_id,
            kind,
            parent,
            title: required_text(title.into(), "content", "title")?,
            description: normalize_optional(description),
            display_order,
            is_active,
            body: None,
            bible_references: Vec::new(),
        })
    }

    /// Attaches the study text and scripture references.
    #[must_use]
    pub fn with_body(mut self, body: Option<String>, bible_references: Vec<String>) -> Self {
        self.body = normalize_optional(body);
        self.bible_references = bible_references
            .into_iter()
            .map(|r| r.trim().to_owned())
            .filter(|r| !r.is_empty())
            .collect();
        self
    }

    #[must_use]
    pub fn id(&self) -> ContentId {
        self.id
    }

    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    #[must_use]
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    #[must_use]
    pub fn is_lesson(&self) -> bool {
        self.kind == ContentKind::Lesson
    }

    #[must_use]
    pub fn parent(&self) -> ParentRef {
        self.parent
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn display_order(&self) -> i32 {
        self.display_order
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    #[must_use]
    pub fn bible_references(&self) -> &[String] {
        &self.bible_references
    }

    /// Sibling ordering key: display order first, id as tie-breaker.
    #[must_use]
    pub fn sort_key(&self) -> (i32, ContentId) {
        (self.display_order, self.id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_ref_from_parts() {
        let raw = Uuid::from_u128(9);
        assert_eq!(
            ParentRef::from_parts("category", raw).unwrap(),
            ParentRef::Category(CategoryId::new(raw))
        );
        assert_eq!(
            ParentRef::from_parts("content", raw).unwrap(),
            ParentRef::Content(ContentId::new(raw))
        );
        assert_eq!(
            ParentRef::from_parts("topic", raw).unwrap_err(),
            RecordError::UnknownParentType("topic".into())
        );
    }

    #[test]
    fn content_kind_rejects_unknown() {
        assert_eq!(ContentKind::parse("lesson").unwrap(), ContentKind::Lesson);
        assert!(matches!(
            ContentKind::parse("video"),
            Err(RecordError::UnknownContentKind(_))
        ));
    }

    #[test]
    fn with_body_drops_blank_references() {
        let node = ContentNode::new(
            ContentId::from_u128(1),
            TopicId::from_u128(1),
            ContentKind::Lesson,
            ParentRef::Category(CategoryId::from_u128(1)),
            "In the beginning",
            None,
            1,
            true,
        )
        .unwrap()
        .with_body(Some("  ".into()), vec!["Genesis 1:1".into(), " ".into()]);

        assert_eq!(node.body(), None);
        assert_eq!(node.bible_references(), ["Genesis 1:1".to_string()]);
    }
}
