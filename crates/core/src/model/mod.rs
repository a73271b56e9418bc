mod category;
mod character;
mod content;
mod diagnostic;
mod ids;
mod mark;
pub mod record;
mod role;
mod topic;

pub use category::Category;
pub use character::{BibleCharacter, CharacterProfile, Testament};
pub use content::{ContentKind, ContentNode, ParentRef};
pub use diagnostic::{Diagnostic, IgnoredMarkReason};
pub use ids::{CategoryId, CharacterId, ContentId, ParseIdError, TopicId, UserId};
pub use mark::ProgressMark;
pub use record::{CategoryRecord, ContentRecord, ProgressRecord, RecordError, TopicRecord};
pub use role::Role;
pub use topic::{DifficultyLevel, Topic, TopicDetails};
