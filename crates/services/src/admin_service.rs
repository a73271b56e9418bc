use std::sync::Arc;

use storage::repository::{
    CategoryRepository, CharacterRepository, ContentRepository, RoleRepository, Storage,
    TopicRepository,
};
use study_core::model::{
    BibleCharacter, Category, CategoryId, CharacterId, CharacterProfile, ContentId, ContentKind,
    ContentNode, ParentRef, Role, Testament, Topic, TopicDetails, TopicId, UserId,
};

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::AdminError;

/// Editable fields of a topic.
#[derive(Debug, Clone, Default)]
pub struct TopicDraft {
    pub title: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub details: TopicDetails,
}

#[derive(Debug, Clone)]
pub struct CategoryDraft {
    pub topic_id: TopicId,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
}

#[derive(Debug, Clone)]
pub struct ContentDraft {
    pub topic_id: TopicId,
    pub kind: ContentKind,
    pub parent: ParentRef,
    pub title: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub body: Option<String>,
    pub bible_references: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CharacterDraft {
    pub name: String,
    pub testament: Testament,
    pub profile: CharacterProfile,
}

/// Administrative writes to the catalog.
///
/// Every operation checks that `actor` holds [`Role::Admin`] and drops the
/// cached tree of the topic it touched.
#[derive(Clone)]
pub struct AdminService {
    clock: Clock,
    topics: Arc<dyn TopicRepository>,
    categories: Arc<dyn CategoryRepository>,
    contents: Arc<dyn ContentRepository>,
    characters: Arc<dyn CharacterRepository>,
    roles: Arc<dyn RoleRepository>,
    catalog: Arc<CatalogService>,
}

impl AdminService {
    #[must_use]
    pub fn new(clock: Clock, storage: &Storage, catalog: Arc<CatalogService>) -> Self {
        Self {
            clock,
            topics: Arc::clone(&storage.topics),
            categories: Arc::clone(&storage.categories),
            contents: Arc::clone(&storage.contents),
            characters: Arc::clone(&storage.characters),
            roles: Arc::clone(&storage.roles),
            catalog,
        }
    }

    async fn require_admin(&self, actor: UserId) -> Result<(), AdminError> {
        if self.roles.roles_for(actor).await?.contains(&Role::Admin) {
            Ok(())
        } else {
            tracing::warn!(%actor, "admin action rejected");
            Err(AdminError::Forbidden(actor))
        }
    }

    async fn require_topic(&self, topic_id: TopicId) -> Result<(), AdminError> {
        match self.topics.get_topic(topic_id).await? {
            Some(_) => Ok(()),
            None => Err(AdminError::NotFound {
                entity: "topic",
                id: topic_id.to_string(),
            }),
        }
    }

    /// Create a topic with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admins,
    /// `AdminError::Record` if the draft is invalid and
    /// `AdminError::Storage` if persistence fails.
    pub async fn create_topic(
        &self,
        actor: UserId,
        draft: TopicDraft,
    ) -> Result<Topic, AdminError> {
        self.require_admin(actor).await?;
        let topic = Topic::new(
            TopicId::random(),
            draft.title,
            draft.description,
            draft.display_order,
            draft.is_active,
            draft.details,
            self.clock.now(),
        )?;
        self.topics.upsert_topic(&topic).await?;
        self.catalog.invalidate(topic.id());
        tracing::info!(%actor, topic_id = %topic.id(), "topic created");
        Ok(topic)
    }

    /// Replace the editable fields of an existing topic.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the topic does not exist; otherwise
    /// as [`AdminService::create_topic`].
    pub async fn update_topic(
        &self,
        actor: UserId,
        topic_id: TopicId,
        draft: TopicDraft,
    ) -> Result<Topic, AdminError> {
        self.require_admin(actor).await?;
        let existing = self
            .topics
            .get_topic(topic_id)
            .await?
            .ok_or_else(|| AdminError::NotFound {
                entity: "topic",
                id: topic_id.to_string(),
            })?;

        let topic = Topic::new(
            topic_id,
            draft.title,
            draft.description,
            draft.display_order,
            draft.is_active,
            draft.details,
            existing.created_at,
        )?;
        self.topics.upsert_topic(&topic).await?;
        self.catalog.invalidate(topic_id);
        tracing::info!(%actor, %topic_id, "topic updated");
        Ok(topic)
    }

    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the topic does not exist; otherwise
    /// as [`AdminService::create_topic`].
    pub async fn create_category(
        &self,
        actor: UserId,
        draft: CategoryDraft,
    ) -> Result<Category, AdminError> {
        self.require_admin(actor).await?;
        self.require_topic(draft.topic_id).await?;
        let category = Category::new(
            CategoryId::random(),
            draft.topic_id,
            draft.title,
            draft.description,
            draft.image_url,
            draft.display_order,
            true,
        )?;
        self.categories.upsert_category(&category).await?;
        self.catalog.invalidate(category.topic_id());
        Ok(category)
    }

    async fn parent_topic(&self, parent: ParentRef) -> Result<Option<TopicId>, AdminError> {
        let owner = match parent {
            ParentRef::Category(id) => self
                .categories
                .list_categories()
                .await?
                .into_iter()
                .find(|c| c.id == id)
                .map(|c| c.topic_id),
            ParentRef::Content(id) => self.contents.get_content(id).await?.map(|c| c.topic_id),
        };
        Ok(owner)
    }

    /// Add a lesson or subcategory under a parent of the same topic.
    ///
    /// A parent that does not exist yet is accepted and shows up as an
    /// orphan diagnostic when the tree is next built.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the topic does not exist,
    /// `AdminError::CrossTopicParent` if the parent belongs to another topic;
    /// otherwise as [`AdminService::create_topic`].
    pub async fn create_content(
        &self,
        actor: UserId,
        draft: ContentDraft,
    ) -> Result<ContentNode, AdminError> {
        self.require_admin(actor).await?;
        self.require_topic(draft.topic_id).await?;
        if let Some(parent_topic_id) = self.parent_topic(draft.parent).await? {
            if parent_topic_id != draft.topic_id {
                tracing::warn!(
                    %actor,
                    topic_id = %draft.topic_id,
                    %parent_topic_id,
                    "content parent belongs to another topic"
                );
                return Err(AdminError::CrossTopicParent {
                    parent: draft.parent,
                    parent_topic_id,
                });
            }
        }
        let node = ContentNode::new(
            ContentId::random(),
            draft.topic_id,
            draft.kind,
            draft.parent,
            draft.title,
            draft.description,
            draft.display_order,
            true,
        )?
        .with_body(draft.body, draft.bible_references);
        self.contents.upsert_content(&node).await?;
        self.catalog.invalidate(node.topic_id());
        Ok(node)
    }

    /// # Errors
    ///
    /// As [`AdminService::create_topic`].
    pub async fn create_character(
        &self,
        actor: UserId,
        draft: CharacterDraft,
    ) -> Result<BibleCharacter, AdminError> {
        self.require_admin(actor).await?;
        let character = BibleCharacter::new(
            CharacterId::random(),
            draft.name,
            draft.testament,
            draft.profile,
            self.clock.now(),
        )?;
        self.characters.upsert_character(&character).await?;
        Ok(character)
    }

    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admins and
    /// `AdminError::Storage` if the grant cannot be stored.
    pub async fn grant_role(
        &self,
        actor: UserId,
        user_id: UserId,
        role: Role,
    ) -> Result<(), AdminError> {
        self.require_admin(actor).await?;
        self.roles.grant_role(user_id, role).await?;
        tracing::info!(%actor, %user_id, role = role.as_str(), "role granted");
        Ok(())
    }
}
