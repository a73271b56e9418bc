//! Raw row shapes as the store hands them over.
//!
//! Text columns are optional and discriminators are plain strings; nothing
//! here is trusted until it has been turned into a domain entity through one
//! of the `into_*` conversions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::category::Category;
use crate::model::content::{ContentKind, ContentNode, ParentRef};
use crate::model::ids::{CategoryId, ContentId, TopicId, UserId};
use crate::model::mark::ProgressMark;
use crate::model::topic::{DifficultyLevel, Topic, TopicDetails};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecordError {
    #[error("{entity} is missing required field `{field}`")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("`{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("unknown content type: {0}")]
    UnknownContentKind(String),

    #[error("unknown parent type: {0}")]
    UnknownParentType(String),

    #[error("unknown difficulty level: {0}")]
    UnknownDifficulty(String),

    #[error("unknown testament: {0}")]
    UnknownTestament(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

fn present<T>(value: Option<T>, entity: &'static str, field: &'static str) -> Result<T, RecordError> {
    value.ok_or(RecordError::MissingField { entity, field })
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub id: TopicId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
    pub image_url: Option<String>,
    pub instructor: Option<String>,
    pub difficulty_level: Option<String>,
    pub duration_weeks: Option<i32>,
    pub background_color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TopicRecord {
    /// A null flag counts as inactive.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active == Some(true)
    }

    #[must_use]
    pub fn from_topic(topic: &Topic) -> Self {
        let details = topic.details();
        Self {
            id: topic.id(),
            title: Some(topic.title().to_owned()),
            description: topic.description().map(str::to_owned),
            display_order: Some(topic.display_order()),
            is_active: Some(topic.is_active()),
            image_url: details.image_url.clone(),
            instructor: details.instructor.clone(),
            difficulty_level: details.difficulty.map(|d| d.as_str().to_owned()),
            duration_weeks: details
                .duration_weeks
                .map(|w| i32::try_from(w).unwrap_or(i32::MAX)),
            background_color: details.background_color.clone(),
            created_at: topic.created_at(),
        }
    }

    /// # Errors
    ///
    /// Returns `RecordError` if the title is missing or a typed column holds
    /// an unrecognised value.
    pub fn into_topic(self) -> Result<Topic, RecordError> {
        let is_active = self.is_active();
        let difficulty = self
            .difficulty_level
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(DifficultyLevel::parse)
            .transpose()?;
        let duration_weeks = self
            .duration_weeks
            .map(|w| {
                u32::try_from(w).map_err(|_| RecordError::OutOfRange {
                    field: "duration_weeks",
                    value: i64::from(w),
                })
            })
            .transpose()?;

        Topic::new(
            self.id,
            present(self.title, "topic", "title")?,
            self.description,
            self.display_order.unwrap_or_default(),
            is_active,
            TopicDetails {
                image_url: self.image_url,
                instructor: self.instructor,
                difficulty,
                duration_weeks,
                background_color: self.background_color,
            },
            self.created_at,
        )
    }
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub topic_id: TopicId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl CategoryRecord {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active == Some(true)
    }

    #[must_use]
    pub fn from_category(category: &Category) -> Self {
        Self {
            id: category.id(),
            topic_id: category.topic_id(),
            title: Some(category.title().to_owned()),
            description: category.description().map(str::to_owned),
            image_url: category.image_url().map(str::to_owned),
            display_order: Some(category.display_order()),
            is_active: Some(category.is_active()),
        }
    }

    /// # Errors
    ///
    /// Returns `RecordError::MissingField` if the title is missing or blank.
    pub fn into_category(self) -> Result<Category, RecordError> {
        let is_active = self.is_active();
        Category::new(
            self.id,
            self.topic_id,
            present(self.title, "category", "title")?,
            self.description,
            self.image_url,
            self.display_order.unwrap_or_default(),
            is_active,
        )
    }
}

//
// ─── CONTENT ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: ContentId,
    pub topic_id: TopicId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content_type: Option<String>,
    pub parent_type: Option<String>,
    pub parent_id: Option<Uuid>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
    pub body_content: Option<String>,
    pub bible_references: Option<Vec<String>>,
}

impl ContentRecord {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active == Some(true)
    }

    /// Decodes the `parent_type`/`parent_id` pair.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if either half is missing or the type is unknown.
    pub fn parent_ref(&self) -> Result<ParentRef, RecordError> {
        let parent_type = present(self.parent_type.as_deref(), "content", "parent_type")?;
        let parent_id = present(self.parent_id, "content", "parent_id")?;
        ParentRef::from_parts(parent_type, parent_id)
    }

    #[must_use]
    pub fn from_node(node: &ContentNode) -> Self {
        Self {
            id: node.id(),
            topic_id: node.topic_id(),
            title: Some(node.title().to_owned()),
            description: node.description().map(str::to_owned),
            content_type: Some(node.kind().as_str().to_owned()),
            parent_type: Some(node.parent().parent_type().to_owned()),
            parent_id: Some(node.parent().raw_id()),
            display_order: Some(node.display_order()),
            is_active: Some(node.is_active()),
            body_content: node.body().map(str::to_owned),
            bible_references: if node.bible_references().is_empty() {
                None
            } else {
                Some(node.bible_references().to_vec())
            },
        }
    }

    /// # Errors
    ///
    /// Returns `RecordError` if a required column is missing or a
    /// discriminator holds an unknown value.
    pub fn into_node(self) -> Result<ContentNode, RecordError> {
        let parent = self.parent_ref()?;
        let kind = ContentKind::parse(present(
            self.content_type.as_deref(),
            "content",
            "content_type",
        )?)?;
        let is_active = self.is_active();
        let node = ContentNode::new(
            self.id,
            self.topic_id,
            kind,
            parent,
            present(self.title, "content", "title")?,
            self.description,
            self.display_order.unwrap_or_default(),
            is_active,
        )?;
        Ok(node.with_body(self.body_content, self.bible_references.unwrap_or_default()))
    }
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: UserId,
    pub topic_id: TopicId,
    pub lesson_id: Option<ContentId>,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress_percentage: Option<i32>,
    pub notes: Option<String>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_mark(mark: &ProgressMark) -> Self {
        Self {
            user_id: mark.user_id,
            topic_id: mark.topic_id,
            lesson_id: Some(mark.lesson_id),
            completed_at: mark.completed_at,
            progress_percentage: mark.percentage.map(i32::from),
            notes: mark.notes.clone(),
        }
    }

    /// # Errors
    ///
    /// Returns `RecordError` if no lesson is referenced or the percentage is
    /// outside `0..=100`.
    pub fn into_mark(self) -> Result<ProgressMark, RecordError> {
        let lesson_id = present(self.lesson_id, "progress", "lesson_id")?;
        let percentage = self
            .progress_percentage
            .map(|p| {
                u8::try_from(p)
                    .ok()
                    .filter(|p| *p <= 100)
                    .ok_or(RecordError::OutOfRange {
                        field: "progress_percentage",
                        value: i64::from(p),
                    })
            })
            .transpose()?;

        Ok(ProgressMark {
            user_id: self.user_id,
            topic_id: self.topic_id,
            lesson_id,
            completed_at: self.completed_at,
            percentage,
            notes: self.notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty()),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
