use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::TopicId;
use crate::model::record::RecordError;

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }

    /// Parses the stored representation, ignoring case and surrounding space.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::UnknownDifficulty` for anything else.
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(RecordError::UnknownDifficulty(raw.to_owned())),
        }
    }
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

/// Optional presentation details shown on topic cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicDetails {
    pub image_url: Option<String>,
    pub instructor: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    pub duration_weeks: Option<u32>,
    pub background_color: Option<String>,
}

/// Top-level study subject; the root of one content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    id: TopicId,
    title: String,
    description: Option<String>,
    display_order: i32,
    is_active: bool,
    details: TopicDetails,
    created_at: DateTime<Utc>,
}

impl Topic {
    /// Creates a new Topic.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::MissingField` if the title is empty or whitespace-only.
    pub fn new(
        id: TopicId,
        title: impl Into<String>,
        description: Option<String>,
        display_order: i32,
        is_active: bool,
        details: TopicDetails,
        created_at: DateTime<Utc>,
    ) -> Result<Self, RecordError> {
        let title = required_text(title.into(), "topic", "title")?;
        let details = TopicDetails {
            image_url: normalize_optional(details.image_url),
            instructor: normalize_optional(details.instructor),
            background_color: normalize_optional(details.background_color),
            ..details
        };

        Ok(Self {
            id,
            title,
            description: normalize_optional(description),
            display_order,
            is_active,
            details,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> TopicId {
        self.id
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
    pub fn details(&self) -> &TopicDetails {
        &self.details
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

pub(crate) fn required_text(
    value: String,
    entity: &'static str,
    field: &'static str,
) -> Result<String, RecordError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordError::MissingField { entity, field });
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
