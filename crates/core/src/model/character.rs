use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::CharacterId;
use crate::model::record::RecordError;
use crate::model::topic::{normalize_optional, required_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Testament {
    Old,
    New,
}

impl Testament {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Testament::Old => "old",
            Testament::New => "new",
        }
    }

    /// Accepts both the short form (`old`) and the admin form label
    /// (`Old Testament`).
    ///
    /// # Errors
    ///
    /// Returns `RecordError::UnknownTestament` otherwise.
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        let lowered = raw.trim().to_ascii_lowercase();
        match lowered.strip_suffix(" testament").unwrap_or(&lowered) {
            "old" => Ok(Self::Old),
            "new" => Ok(Self::New),
            _ => Err(RecordError::UnknownTestament(raw.to_owned())),
        }
    }
}

/// A person from scripture shown in the character gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibleCharacter {
    id: CharacterId,
    name: String,
    testament: Testament,
    category: Option<String>,
    description: Option<String>,
    story_summary: Option<String>,
    key_verses: Vec<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

/// Free-text fields of a character, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterProfile {
    pub category: Option<String>,
    pub description: Option<String>,
    pub story_summary: Option<String>,
    pub key_verses: Vec<String>,
    pub image_url: Option<String>,
}

impl BibleCharacter {
    /// # Errors
    ///
    /// Returns `RecordError::MissingField` if the name is blank.
    pub fn new(
        id: CharacterId,
        name: impl Into<String>,
        testament: Testament,
        profile: CharacterProfile,
        created_at: DateTime<Utc>,
    ) -> Result<Self, RecordError> {
        Ok(Self {
            id,
            name: required_text(name.into(), "character", "name")?,
            testament,
            category: normalize_optional(profile.category),
            description: normalize_optional(profile.description),
            story_summary: normalize_optional(profile.story_summary),
            key_verses: profile
                .key_verses
                .into_iter()
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .collect(),
            image_url: normalize_optional(profile.image_url),
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> CharacterId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn testament(&self) -> Testament {
        self.testament
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn story_summary(&self) -> Option<&str> {
        self.story_summary.as_deref()
    }

    #[must_use]
    pub fn key_verses(&self) -> &[String] {
        &self.key_verses
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testament_accepts_both_spellings() {
        assert_eq!(Testament::parse("old").unwrap(), Testament::Old);
        assert_eq!(Testament::parse("New Testament").unwrap(), Testament::New);
        assert!(Testament::parse("apocrypha").is_err());
    }
}
