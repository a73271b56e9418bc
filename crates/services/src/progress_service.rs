use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use storage::repository::ProgressRepository;
use study_core::model::{ContentId, ProgressMark, Topic, TopicId, UserId};
use study_core::progress::Completion;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::ProgressError;

/// One started topic on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicOverview {
    pub topic: Topic,
    pub completion: Completion,
    pub last_completed_at: Option<DateTime<Utc>>,
}

/// Cross-topic summary of a user's study progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressOverview {
    pub user_id: UserId,
    pub topics: Vec<TopicOverview>,
    pub topics_started: u32,
    pub topics_completed: u32,
    /// Leaf lessons summed over the listed topics.
    pub lessons: Completion,
}

impl ProgressOverview {
    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.lessons.percentage()
    }
}

/// Records lesson completions and summarizes them.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    catalog: Arc<CatalogService>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        progress: Arc<dyn ProgressRepository>,
        catalog: Arc<CatalogService>,
    ) -> Self {
        Self {
            clock,
            progress,
            catalog,
        }
    }

    /// Marks `lesson_id` as completed now.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NotALesson` if the id is not a leaf lesson of
    /// the topic's tree, `ProgressError::Catalog` if the tree cannot be built
    /// and `ProgressError::Storage` if the mark cannot be stored.
    pub async fn record_completion(
        &self,
        user_id: UserId,
        topic_id: TopicId,
        lesson_id: ContentId,
        notes: Option<String>,
    ) -> Result<ProgressMark, ProgressError> {
        let built = self.catalog.topic_tree(topic_id).await?;
        let is_leaf_lesson = built
            .tree
            .find(lesson_id)
            .is_some_and(|b| b.is_leaf() && b.node().is_lesson());
        if !is_leaf_lesson {
            return Err(ProgressError::NotALesson(lesson_id));
        }

        let mut mark = ProgressMark::completed(user_id, topic_id, lesson_id, self.clock.now());
        mark.notes = notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty());
        self.progress.upsert_progress(&mark).await?;
        tracing::debug!(%user_id, %topic_id, %lesson_id, "lesson completed");
        Ok(mark)
    }

    /// Summarizes every active topic the user has marks in.
    ///
    /// Topics whose tree cannot be built are skipped and logged.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the marks cannot be read.
    pub async fn overview(&self, user_id: UserId) -> Result<ProgressOverview, ProgressError> {
        let records = self.progress.list_progress(user_id).await?;
        let topic_ids: BTreeSet<TopicId> = records.iter().map(|r| r.topic_id).collect();

        let mut topics = Vec::with_capacity(topic_ids.len());
        for topic_id in topic_ids {
            match self
                .catalog
                .user_progress_from(topic_id, user_id, &records)
                .await
            {
                Ok(view) => topics.push(TopicOverview {
                    topic: view.progress.topic,
                    completion: view.progress.completion,
                    last_completed_at: view.progress.last_completed_at,
                }),
                Err(err) => {
                    tracing::warn!(%user_id, %topic_id, error = %err, "skipping topic in overview");
                }
            }
        }
        topics.sort_by_key(|t| (t.topic.display_order(), t.topic.id()));

        let count = |pred: fn(&TopicOverview) -> bool| {
            u32::try_from(topics.iter().filter(|t| pred(t)).count()).unwrap_or(u32::MAX)
        };
        let topics_started = count(|t| t.completion.is_started());
        let topics_completed = count(|t| t.completion.is_complete());
        let lessons = topics.iter().map(|t| t.completion).sum();

        Ok(ProgressOverview {
            user_id,
            topics,
            topics_started,
            topics_completed,
            lessons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use storage::repository::{InMemoryRepository, Storage};
    use study_core::model::{CategoryId, CategoryRecord, ContentRecord, TopicRecord};
    use study_core::time::{fixed_clock, fixed_now};

    const USER: u128 = 9;

    fn topic(id: u128, order: i32) -> TopicRecord {
        TopicRecord {
            id: TopicId::from_u128(id),
            title: Some(format!("Topic {id}")),
            description: None,
            display_order: Some(order),
            is_active: Some(true),
            image_url: None,
            instructor: None,
            difficulty_level: None,
            duration_weeks: None,
            background_color: None,
            created_at: fixed_now(),
        }
    }

    fn category(id: u128, topic: u128) -> CategoryRecord {
        CategoryRecord {
            id: CategoryId::from_u128(id),
            topic_id: TopicId::from_u128(topic),
            title: Some(format!("Category {id}")),
            description: None,
            image_url: None,
            display_order: Some(1),
            is_active: Some(true),
        }
    }

    fn node(id: u128, topic: u128, kind: &str, parent_type: &str, parent: u128) -> ContentRecord {
        ContentRecord {
            id: ContentId::from_u128(id),
            topic_id: TopicId::from_u128(topic),
            title: Some(format!("Node {id}")),
            description: None,
            content_type: Some(kind.into()),
            parent_type: Some(parent_type.into()),
            parent_id: Some(CategoryId::from_u128(parent).value()),
            display_order: Some(i32::try_from(id).unwrap()),
            is_active: Some(true),
            body_content: None,
            bible_references: None,
        }
    }

    /// Topic 1: category 10 with lessons 1, 2 and subcategory 3.
    /// Topic 2: category 20 with lesson 4. Topic 5 is cyclic.
    fn service() -> ProgressService {
        let repo = InMemoryRepository::new();
        for (id, order) in [(1, 2), (2, 1), (5, 3)] {
            repo.insert_topic_record(topic(id, order)).unwrap();
        }
        repo.insert_category_record(category(10, 1)).unwrap();
        repo.insert_category_record(category(20, 2)).unwrap();
        repo.insert_category_record(category(50, 5)).unwrap();
        for record in [
            node(1, 1, "lesson", "category", 10),
            node(2, 1, "lesson", "category", 10),
            node(3, 1, "subcategory", "category", 10),
            node(4, 2, "lesson", "category", 20),
            node(51, 5, "lesson", "content", 52),
            node(52, 5, "subcategory", "content", 51),
        ] {
            repo.insert_content_record(record).unwrap();
        }
        let storage = Storage::from_in_memory(&repo);
        let catalog = Arc::new(CatalogService::new(&storage, CatalogConfig::default()));
        ProgressService::new(fixed_clock(), Arc::clone(&storage.progress), catalog)
    }

    #[tokio::test]
    async fn records_completion_with_clock_time() {
        let service = service();
        let user = UserId::from_u128(USER);
        let mark = service
            .record_completion(
                user,
                TopicId::from_u128(1),
                ContentId::from_u128(1),
                Some("  read twice ".into()),
            )
            .await
            .unwrap();
        assert_eq!(mark.completed_at, Some(fixed_now()));
        assert_eq!(mark.percentage, Some(100));
        assert_eq!(mark.notes.as_deref(), Some("read twice"));
    }

    #[tokio::test]
    async fn rejects_subcategories_and_foreign_lessons() {
        let service = service();
        let user = UserId::from_u128(USER);
        for lesson in [3, 4, 404] {
            let err = service
                .record_completion(user, TopicId::from_u128(1), ContentId::from_u128(lesson), None)
                .await
                .unwrap_err();
            assert!(matches!(err, ProgressError::NotALesson(id) if id == ContentId::from_u128(lesson)));
        }
    }

    #[tokio::test]
    async fn overview_totals_started_topics() {
        let service = service();
        let user = UserId::from_u128(USER);
        for (topic, lesson) in [(1, 1), (2, 4)] {
            service
                .record_completion(user, TopicId::from_u128(topic), ContentId::from_u128(lesson), None)
                .await
                .unwrap();
        }

        let overview = service.overview(user).await.unwrap();
        let ids: Vec<_> = overview.topics.iter().map(|t| t.topic.id()).collect();
        assert_eq!(ids, vec![TopicId::from_u128(2), TopicId::from_u128(1)]);
        assert_eq!(overview.topics_started, 2);
        assert_eq!(overview.topics_completed, 1);
        assert_eq!(overview.lessons, Completion::new(2, 3));
        assert!((overview.percentage() - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(overview.topics[0].last_completed_at, Some(fixed_now()));
    }

    #[tokio::test]
    async fn overview_skips_topics_that_fail_to_build() {
        let service = service();
        let user = UserId::from_u128(USER);
        service
            .record_completion(user, TopicId::from_u128(1), ContentId::from_u128(2), None)
            .await
            .unwrap();
        service
            .progress
            .upsert_progress(&ProgressMark::completed(
                user,
                TopicId::from_u128(5),
                ContentId::from_u128(51),
                fixed_now(),
            ))
            .await
            .unwrap();

        let overview = service.overview(user).await.unwrap();
        assert_eq!(overview.topics.len(), 1);
        assert_eq!(overview.topics[0].topic.id(), TopicId::from_u128(1));
        assert_eq!(overview.lessons, Completion::new(1, 2));
    }

    #[tokio::test]
    async fn overview_without_marks_is_empty() {
        let overview = service().overview(UserId::from_u128(USER)).await.unwrap();
        assert!(overview.topics.is_empty());
        assert_eq!(overview.lessons, Completion::default());
        assert!(overview.percentage().abs() < f64::EPSILON);
    }
}
