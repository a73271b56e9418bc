use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};
use study_core::model::{
    BibleCharacter, Category, CategoryId, CategoryRecord, CharacterId, ContentId, ContentNode,
    ContentRecord, ProgressMark, ProgressRecord, Role, Topic, TopicId, TopicRecord, UserId,
};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Topic rows. Reads hand back raw records; validation happens at ingestion.
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// All topic rows, active or not.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the rows cannot be read.
    async fn list_topics(&self) -> Result<Vec<TopicRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on read failure; a missing topic is `Ok(None)`.
    async fn get_topic(&self, id: TopicId) -> Result<Option<TopicRecord>, StorageError>;

    /// Persist or update a topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the topic cannot be stored.
    async fn upsert_topic(&self, topic: &Topic) -> Result<(), StorageError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Category rows of every topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the rows cannot be read.
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the category cannot be stored.
    async fn upsert_category(&self, category: &Category) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Content rows of every topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the rows cannot be read.
    async fn list_contents(&self) -> Result<Vec<ContentRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on read failure; a missing row is `Ok(None)`.
    async fn get_content(&self, id: ContentId) -> Result<Option<ContentRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the node cannot be stored.
    async fn upsert_content(&self, node: &ContentNode) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Every mark stored for `user_id`, across topics.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the rows cannot be read.
    async fn list_progress(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, StorageError>;

    /// Stores a mark, replacing any earlier mark of the same user and lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the mark cannot be stored.
    async fn upsert_progress(&self, mark: &ProgressMark) -> Result<(), StorageError>;
}

#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the rows cannot be read or decoded.
    async fn list_characters(&self) -> Result<Vec<BibleCharacter>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the character cannot be stored.
    async fn upsert_character(&self, character: &BibleCharacter) -> Result<(), StorageError>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the rows cannot be read or decoded.
    async fn roles_for(&self, user_id: UserId) -> Result<Vec<Role>, StorageError>;

    /// Granting a role the user already holds is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the grant cannot be stored.
    async fn grant_role(&self, user_id: UserId, role: Role) -> Result<(), StorageError>;
}

#[derive(Default)]
struct Tables {
    topics: BTreeMap<TopicId, TopicRecord>,
    categories: BTreeMap<CategoryId, CategoryRecord>,
    contents: BTreeMap<ContentId, ContentRecord>,
    progress: BTreeMap<(UserId, ContentId), ProgressRecord>,
    characters: BTreeMap<CharacterId, BibleCharacter>,
    roles: BTreeSet<(UserId, Role)>,
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Rows are kept in raw record form so tests can insert rows that the
/// typed write path would never produce.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    /// Inserts a raw topic row as-is.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_topic_record(&self, record: TopicRecord) -> Result<(), StorageError> {
        self.lock()?.topics.insert(record.id, record);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_category_record(&self, record: CategoryRecord) -> Result<(), StorageError> {
        self.lock()?.categories.insert(record.id, record);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_content_record(&self, record: ContentRecord) -> Result<(), StorageError> {
        self.lock()?.contents.insert(record.id, record);
        Ok(())
    }
}

#[async_trait]
impl TopicRepository for InMemoryRepository {
    async fn list_topics(&self) -> Result<Vec<TopicRecord>, StorageError> {
        Ok(self.lock()?.topics.values().cloned().collect())
    }

    async fn get_topic(&self, id: TopicId) -> Result<Option<TopicRecord>, StorageError> {
        Ok(self.lock()?.topics.get(&id).cloned())
    }

    async fn upsert_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        self.insert_topic_record(TopicRecord::from_topic(topic))
    }
}

#[async_trait]
impl CategoryRepository for InMemoryRepository {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, StorageError> {
        Ok(self.lock()?.categories.values().cloned().collect())
    }

    async fn upsert_category(&self, category: &Category) -> Result<(), StorageError> {
        self.insert_category_record(CategoryRecord::from_category(category))
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn list_contents(&self) -> Result<Vec<ContentRecord>, StorageError> {
        Ok(self.lock()?.contents.values().cloned().collect())
    }

    async fn get_content(&self, id: ContentId) -> Result<Option<ContentRecord>, StorageError> {
        Ok(self.lock()?.contents.get(&id).cloned())
    }

    async fn upsert_content(&self, node: &ContentNode) -> Result<(), StorageError> {
        self.insert_content_record(ContentRecord::from_node(node))
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn list_progress(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .progress
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn upsert_progress(&self, mark: &ProgressMark) -> Result<(), StorageError> {
        self.lock()?.progress.insert(
            (mark.user_id, mark.lesson_id),
            ProgressRecord::from_mark(mark),
        );
        Ok(())
    }
}

#[async_trait]
impl CharacterRepository for InMemoryRepository {
    async fn list_characters(&self) -> Result<Vec<BibleCharacter>, StorageError> {
        Ok(self.lock()?.characters.values().cloned().collect())
    }

    async fn upsert_character(&self, character: &BibleCharacter) -> Result<(), StorageError> {
        self.lock()?
            .characters
            .insert(character.id(), character.clone());
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for InMemoryRepository {
    async fn roles_for(&self, user_id: UserId) -> Result<Vec<Role>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .roles
            .iter()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, role)| *role)
            .collect())
    }

    async fn grant_role(&self, user_id: UserId, role: Role) -> Result<(), StorageError> {
        self.lock()?.roles.insert((user_id, role));
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub topics: Arc<dyn TopicRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub contents: Arc<dyn ContentRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub characters: Arc<dyn CharacterRepository>,
    pub roles: Arc<dyn RoleRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(&InMemoryRepository::new())
    }

    /// Wraps an existing in-memory repository so tests can keep a handle
    /// for raw inserts.
    #[must_use]
    pub fn from_in_memory(repo: &InMemoryRepository) -> Self {
        Self {
            topics: Arc::new(repo.clone()),
            categories: Arc::new(repo.clone()),
            contents: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            characters: Arc::new(repo.clone()),
            roles: Arc::new(repo.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::{ContentKind, ParentRef, TopicDetails};
    use study_core::time::fixed_now;

    fn build_topic(id: u128) -> Topic {
        Topic::new(
            TopicId::from_u128(id),
            format!("Topic {id}"),
            None,
            1,
            true,
            TopicDetails::default(),
            fixed_now(),
        )
        .unwrap()
    }

    fn build_lesson(id: u128, topic: TopicId) -> ContentNode {
        ContentNode::new(
            ContentId::from_u128(id),
            topic,
            ContentKind::Lesson,
            ParentRef::Category(CategoryId::from_u128(5)),
            "Lesson",
            None,
            1,
            true,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn round_trips_topic_as_record() {
        let repo = InMemoryRepository::new();
        let topic = build_topic(1);
        repo.upsert_topic(&topic).await.unwrap();

        let fetched = repo.get_topic(topic.id()).await.unwrap().unwrap();
        assert_eq!(fetched.into_topic().unwrap(), topic);
        assert!(repo.get_topic(TopicId::from_u128(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn progress_upsert_replaces_same_lesson() {
        let repo = InMemoryRepository::new();
        let topic = build_topic(1);
        let lesson = build_lesson(10, topic.id());
        let user = UserId::from_u128(7);

        let first = ProgressMark::completed(user, topic.id(), lesson.id(), fixed_now());
        let mut second = first.clone();
        second.notes = Some("again".into());
        repo.upsert_progress(&first).await.unwrap();
        repo.upsert_progress(&second).await.unwrap();

        let marks = repo.list_progress(user).await.unwrap();
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].notes.as_deref(), Some("again"));
        assert!(repo.list_progress(UserId::from_u128(8)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn granting_twice_keeps_one_role() {
        let repo = InMemoryRepository::new();
        let user = UserId::from_u128(3);
        repo.grant_role(user, Role::Admin).await.unwrap();
        repo.grant_role(user, Role::Admin).await.unwrap();
        assert_eq!(repo.roles_for(user).await.unwrap(), vec![Role::Admin]);
    }
}
