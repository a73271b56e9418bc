use serde::{Deserialize, Serialize};

use crate::model::content::ParentRef;
use crate::model::ids::ContentId;

/// Why a progress mark did not count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredMarkReason {
    /// The mark names no lesson at all.
    NoLesson,
    /// The lesson is inactive, deleted, or outside the built tree.
    UnknownLesson,
}

/// Non-fatal note about rows left out of a tree or a rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The node's ancestry ends at a parent that is not in the active set.
    OrphanedContent {
        content_id: ContentId,
        missing_parent: ParentRef,
    },
    IgnoredProgressMark {
        lesson_id: Option<ContentId>,
        reason: IgnoredMarkReason,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::CategoryId;

    #[test]
    fn diagnostics_serialize_with_kind_tag() {
        let orphan = Diagnostic::OrphanedContent {
            content_id: ContentId::from_u128(1),
            missing_parent: ParentRef::Category(CategoryId::from_u128(2)),
        };
        let json = serde_json::to_value(&orphan).unwrap();
        assert_eq!(json["kind"], "orphaned_content");

        let ignored = Diagnostic::IgnoredProgressMark {
            lesson_id: None,
            reason: IgnoredMarkReason::NoLesson,
        };
        let json = serde_json::to_value(&ignored).unwrap();
        assert_eq!(json["reason"], "no_lesson");
    }
}
