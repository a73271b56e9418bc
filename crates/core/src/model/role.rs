use serde::{Deserialize, Serialize};

use crate::model::record::RecordError;

/// Application role attached to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// # Errors
    ///
    /// Returns `RecordError::UnknownRole` for unrecognised values.
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        match raw.trim() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(RecordError::UnknownRole(other.to_owned())),
        }
    }
}
