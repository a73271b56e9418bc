use serde::{Deserialize, Serialize};

use crate::model::ids::{CategoryId, TopicId};
use crate::model::record::RecordError;
use crate::model::topic::{normalize_optional, required_text};

/// First-level grouping of content within a topic (a "class").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    topic_id: TopicId,
    title: String,
    description: Option<String>,
    image_url: Option<String>,
    display_order: i32,
    is_active: bool,
}

impl Category {
    /// Creates a new Category.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::MissingField` if the title is blank.
    pub fn new(
        id: CategoryId,
        topic_id: TopicId,
        title: impl Into<String>,
        description: Option<String>,
        image_url: Option<String>,
        display_order: i32,
        is_active: bool,
    ) -> Result<Self, RecordError> {
        Ok(Self {
            id,
            topic_id,
            title: required_text(title.into(), "category", "title")?,
            description: normalize_optional(description),
            image_url: normalize_optional(image_url),
            display_order,
            is_active,
        })
    }

    #[must_use]
    pub fn id(&self) -> CategoryId {
        self.id
    }

    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        self.topic_id
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
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    #[must_use]
    pub fn display_order(&self) -> i32 {
        self.display_order
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Sibling ordering key: display order first, id as tie-breaker.
    #[must_use]
    pub fn sort_key(&self) -> (i32, CategoryId) {
        (self.display_order, self.id)
    }
}
