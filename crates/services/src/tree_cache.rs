//! Per-topic cache of assembled trees.
//!
//! Every topic carries a generation counter that `invalidate` bumps. A
//! build records the generation it started from and may only be stored
//! while that generation is still current, so a build racing an
//! invalidation can never resurrect the outdated tree.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use study_core::model::TopicId;
use study_core::tree::BuiltTree;

/// Snapshot of a topic's generation taken before a build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Generation {
    epoch: u64,
    topic: u64,
}

#[derive(Default)]
struct CacheState {
    trees: HashMap<TopicId, Arc<BuiltTree>>,
    generations: HashMap<TopicId, u64>,
    epoch: u64,
}

impl CacheState {
    fn generation(&self, topic_id: TopicId) -> Generation {
        Generation {
            epoch: self.epoch,
            topic: self.generations.get(&topic_id).copied().unwrap_or_default(),
        }
    }
}

pub(crate) struct TreeCache {
    enabled: bool,
    state: RwLock<CacheState>,
}

impl TreeCache {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub(crate) fn get(&self, topic_id: TopicId) -> Option<Arc<BuiltTree>> {
        if !self.enabled {
            return None;
        }
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.trees.get(&topic_id).cloned()
    }

    pub(crate) fn generation(&self, topic_id: TopicId) -> Generation {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.generation(topic_id)
    }

    /// Stores `tree` unless the topic was invalidated after `started`.
    /// Returns whether the tree was stored.
    pub(crate) fn store(&self, topic_id: TopicId, started: Generation, tree: Arc<BuiltTree>) -> bool {
        if !self.enabled {
            return false;
        }
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.generation(topic_id) != started {
            return false;
        }
        state.trees.insert(topic_id, tree);
        true
    }

    pub(crate) fn invalidate(&self, topic_id: TopicId) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.trees.remove(&topic_id);
        *state.generations.entry(topic_id).or_default() += 1;
    }

    pub(crate) fn invalidate_all(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.trees.clear();
        state.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::ingest::ingest;
    use study_core::model::TopicRecord;
    use study_core::time::fixed_now;
    use study_core::tree::TreeBuilder;

    fn built(topic: u128) -> Arc<BuiltTree> {
        let record = TopicRecord {
            id: TopicId::from_u128(topic),
            title: Some("Psalms".into()),
            description: None,
            display_order: None,
            is_active: Some(true),
            image_url: None,
            instructor: None,
            difficulty_level: None,
            duration_weeks: None,
            background_color: None,
            created_at: fixed_now(),
        };
        let rows = ingest(TopicId::from_u128(topic), &[record], &[], &[]).unwrap();
        Arc::new(TreeBuilder::build(rows).unwrap())
    }

    #[test]
    fn stores_and_returns_same_arc() {
        let cache = TreeCache::new(true);
        let topic = TopicId::from_u128(1);
        let tree = built(1);
        assert!(cache.store(topic, cache.generation(topic), Arc::clone(&tree)));
        let hit = cache.get(topic).unwrap();
        assert!(Arc::ptr_eq(&hit, &tree));
    }

    #[test]
    fn build_started_before_invalidation_is_not_stored() {
        let cache = TreeCache::new(true);
        let topic = TopicId::from_u128(1);
        let started = cache.generation(topic);
        cache.invalidate(topic);
        assert!(!cache.store(topic, started, built(1)));
        assert!(cache.get(topic).is_none());

        let started = cache.generation(topic);
        cache.invalidate_all();
        assert!(!cache.store(topic, started, built(1)));
    }

    #[test]
    fn invalidation_is_per_topic() {
        let cache = TreeCache::new(true);
        let (a, b) = (TopicId::from_u128(1), TopicId::from_u128(2));
        cache.store(a, cache.generation(a), built(1));
        cache.store(b, cache.generation(b), built(2));
        cache.invalidate(a);
        assert!(cache.get(a).is_none());
        assert!(cache.get(b).is_some());
    }

    #[test]
    fn disabled_cache_never_stores() {
        let cache = TreeCache::new(false);
        let topic = TopicId::from_u128(1);
        assert!(!cache.store(topic, cache.generation(topic), built(1)));
        assert!(cache.get(topic).is_none());
    }
}
