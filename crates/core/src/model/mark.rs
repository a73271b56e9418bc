use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{ContentId, TopicId, UserId};

/// A user's completion record for one lesson.
///
/// `completed_at` is the only field that drives rollups; percentage and
/// notes are carried for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressMark {
    pub user_id: UserId,
    pub topic_id: TopicId,
    pub lesson_id: ContentId,
    pub completed_at: Option<DateTime<Utc>>,
    pub percentage: Option<u8>,
    pub notes: Option<String>,
}

impl ProgressMark {
    /// Builds a mark for a lesson finished at `at`.
    #[must_use]
    pub fn completed(
        user_id: UserId,
        topic_id: TopicId,
        lesson_id: ContentId,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            topic_id,
            lesson_id,
            completed_at: Some(at),
            percentage: Some(100),
            notes: None,
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}
