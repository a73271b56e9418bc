use std::sync::Arc;

use serde::Serialize;
use storage::repository::{
    CategoryRepository, ContentRepository, ProgressRepository, Storage, TopicRepository,
};
use study_core::ingest::{IngestError, ingest, ingest_progress};
use study_core::model::{Diagnostic, ProgressRecord, Topic, TopicId, UserId};
use study_core::progress::{TopicProgress, aggregate};
use study_core::tree::{BuiltTree, TreeBuilder};

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::tree_cache::TreeCache;

/// A user's rollup for one topic plus every row that was left out on the
/// way there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProgressView {
    pub progress: TopicProgress,
    pub diagnostics: Vec<Diagnostic>,
}

/// Read side of the study catalog: topic listings, assembled trees and
/// per-user progress. Trees are cached per topic until invalidated.
pub struct CatalogService {
    topics: Arc<dyn TopicRepository>,
    categories: Arc<dyn CategoryRepository>,
    contents: Arc<dyn ContentRepository>,
    progress: Arc<dyn ProgressRepository>,
    cache: TreeCache,
}

impl CatalogService {
    #[must_use]
    pub fn new(storage: &Storage, config: CatalogConfig) -> Self {
        Self {
            topics: Arc::clone(&storage.topics),
            categories: Arc::clone(&storage.categories),
            contents: Arc::clone(&storage.contents),
            progress: Arc::clone(&storage.progress),
            cache: TreeCache::new(config.cache_trees),
        }
    }

    /// Active topics ordered by display order, then id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if an active topic row is malformed.
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn list_topics(&self) -> Result<Vec<Topic>, CatalogError> {
        let mut topics = Vec::new();
        for record in self.topics.list_topics().await? {
            if !record.is_active() {
                continue;
            }
            let id = record.id;
            let topic = record
                .into_topic()
                .map_err(|source| IngestError::InvalidRow {
                    entity: "topic",
                    id: id.value(),
                    source,
                })?;
            topics.push(topic);
        }
        topics.sort_by_key(|t| (t.display_order(), t.id()));
        Ok(topics)
    }

    /// The assembled tree of `topic_id`, served from the cache when possible.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown or inactive topic,
    /// `CatalogError::Validation` for malformed rows,
    /// `CatalogError::Structural` for cyclic parent references and
    /// `CatalogError::Storage` if repository access fails.
    pub async fn topic_tree(&self, topic_id: TopicId) -> Result<Arc<BuiltTree>, CatalogError> {
        if let Some(hit) = self.cache.get(topic_id) {
            tracing::debug!(%topic_id, "tree cache hit");
            return Ok(hit);
        }
        tracing::debug!(%topic_id, "tree cache miss");

        let started = self.cache.generation(topic_id);
        let tree = Arc::new(self.build_tree(topic_id).await?);
        if !self.cache.store(topic_id, started, Arc::clone(&tree)) {
            tracing::debug!(%topic_id, "tree not cached");
        }
        Ok(tree)
    }

    async fn build_tree(&self, topic_id: TopicId) -> Result<BuiltTree, CatalogError> {
        let topic = self
            .topics
            .get_topic(topic_id)
            .await?
            .ok_or(CatalogError::NotFound(topic_id))?;
        let categories = self.categories.list_categories().await?;
        let contents = self.contents.list_contents().await?;

        let rows = ingest(topic_id, &[topic], &categories, &contents)?;
        let built = TreeBuilder::build(rows).inspect_err(|err| {
            tracing::error!(%topic_id, error = %err, "topic tree is cyclic");
        })?;

        for diagnostic in &built.diagnostics {
            if let Diagnostic::OrphanedContent {
                content_id,
                missing_parent,
            } = diagnostic
            {
                tracing::warn!(
                    %topic_id,
                    %content_id,
                    ?missing_parent,
                    "orphaned content left out of tree"
                );
            }
        }
        tracing::debug!(
            %topic_id,
            nodes = built.tree.content_count(),
            orphans = built.diagnostics.len(),
            "built topic tree"
        );
        Ok(built)
    }

    /// Rolls the user's marks up over the tree of `topic_id`.
    ///
    /// Calling it twice without intervening writes gives equal views.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogService::topic_tree`]; additionally
    /// `CatalogError::Validation` if a mark targets a subcategory.
    pub async fn user_progress(
        &self,
        topic_id: TopicId,
        user_id: UserId,
    ) -> Result<UserProgressView, CatalogError> {
        let records = self.progress.list_progress(user_id).await?;
        self.user_progress_from(topic_id, user_id, &records).await
    }

    /// Like [`CatalogService::user_progress`] over marks fetched by the caller.
    pub(crate) async fn user_progress_from(
        &self,
        topic_id: TopicId,
        user_id: UserId,
        records: &[ProgressRecord],
    ) -> Result<UserProgressView, CatalogError> {
        let built = self.topic_tree(topic_id).await?;
        let marks = ingest_progress(&built.tree, user_id, records)?;
        let progress = aggregate(&built.tree, user_id, &marks.marks);

        let mut diagnostics = built.diagnostics.clone();
        diagnostics.extend(marks.diagnostics);
        Ok(UserProgressView {
            progress,
            diagnostics,
        })
    }

    /// Drops the cached tree of `topic_id`; a build already in flight will
    /// not be cached.
    pub fn invalidate(&self, topic_id: TopicId) {
        tracing::debug!(%topic_id, "invalidating topic tree");
        self.cache.invalidate(topic_id);
    }

    pub fn invalidate_all(&self) {
        tracing::debug!("invalidating all topic trees");
        self.cache.invalidate_all();
    }
}
