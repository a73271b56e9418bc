use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[must_use]
            pub fn new(id: Uuid) -> Self {
                Self(id)
            }

            /// Generates a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Builds an identifier from a raw integer; handy for fixtures.
            #[must_use]
            pub fn from_u128(value: u128) -> Self {
                Self(Uuid::from_u128(value))
            }

            #[must_use]
            pub fn value(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| ParseIdError {
                        kind: stringify!($name),
                    })
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a Topic
    TopicId
);
uuid_id!(
    /// Unique identifier for a Category (a "class" inside a topic)
    CategoryId
);
uuid_id!(
    /// Unique identifier for a lesson or subcategory
    ContentId
);
uuid_id!(
    /// Unique identifier for an authenticated user
    UserId
);
uuid_id!(
    /// Unique identifier for a Bible character profile
    CharacterId
);

// ─── Parse Errors ──────────────────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_id_display_is_hyphenated_uuid() {
        let id = TopicId::from_u128(1);
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000001");
    }

    #[test]
    fn content_id_from_str() {
        let id: ContentId = "00000000-0000-0000-0000-00000000002a".parse().unwrap();
        assert_eq!(id, ContentId::from_u128(42));
    }

    #[test]
    fn category_id_from_str_invalid() {
        let err = "not-a-uuid".parse::<CategoryId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse CategoryId from string");
    }

    #[test]
    fn ids_order_by_value() {
        assert!(ContentId::from_u128(1) < ContentId::from_u128(2));
    }

    #[test]
    fn debug_names_the_kind() {
        let id = UserId::from_u128(7);
        assert_eq!(format!("{id:?}"), "UserId(00000000-0000-0000-0000-000000000007)");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = CharacterId::from_u128(3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000003\"");
    }
}
