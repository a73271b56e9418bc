//! Bottom-up completion rollup over a built content tree.

use std::collections::HashMap;
use std::iter::Sum;
use std::ops::Add;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Category, ContentId, ContentNode, ProgressMark, Topic, UserId};
use crate::tree::{CategoryBranch, ContentBranch, ContentTree};

//
// ─── COMPLETION ────────────────────────────────────────────────────────────────
//

/// Leaf-lesson counts for one node and everything below it.
///
/// Serializes with `percentage` and `is_complete` alongside the counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "CompletionSummary")]
pub struct Completion {
    pub completed: u32,
    pub total: u32,
}

#[derive(Serialize)]
struct CompletionSummary {
    completed: u32,
    total: u32,
    percentage: f64,
    is_complete: bool,
}

impl From<Completion> for CompletionSummary {
    fn from(completion: Completion) -> Self {
        Self {
            completed: completion.completed,
            total: completion.total,
            percentage: completion.percentage(),
            is_complete: completion.is_complete(),
        }
    }
}

impl Completion {
    #[must_use]
    pub fn new(completed: u32, total: u32) -> Self {
        Self { completed, total }
    }

    /// Share of completed leaves in percent; 0 for a node without leaves.
    #[must_use]
    pub fn percentage(self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.completed) / f64::from(self.total) * 100.0
    }

    /// Fully done. A node without leaves is never complete.
    #[must_use]
    pub fn is_complete(self) -> bool {
        self.total > 0 && self.completed == self.total
    }

    #[must_use]
    pub fn is_started(self) -> bool {
        self.completed > 0
    }
}

impl Add for Completion {
    type Output = Completion;

    fn add(self, rhs: Self) -> Self::Output {
        Completion {
            completed: self.completed + rhs.completed,
            total: self.total + rhs.total,
        }
    }
}

impl Sum for Completion {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Completion::default(), Add::add)
    }
}

//
// ─── ANNOTATED TREE ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentProgress {
    pub node: ContentNode,
    pub completion: Completion,
    /// Set on completed leaves only.
    pub completed_at: Option<DateTime<Utc>>,
    pub children: Vec<ContentProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub category: Category,
    pub completion: Completion,
    pub children: Vec<ContentProgress>,
}

/// A user's view of one topic tree with counts at every level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicProgress {
    pub topic: Topic,
    pub user_id: UserId,
    pub completion: Completion,
    pub categories: Vec<CategoryProgress>,
    /// Most recent completion among the counted leaves.
    pub last_completed_at: Option<DateTime<Utc>>,
}

impl TopicProgress {
    /// First leaf lesson, in reading order, that is not yet completed.
    #[must_use]
    pub fn next_lesson(&self) -> Option<&ContentNode> {
        self.categories
            .iter()
            .flat_map(|c| c.children.iter())
            .find_map(ContentProgress::first_incomplete_leaf)
    }

    #[must_use]
    pub fn find(&self, id: ContentId) -> Option<&ContentProgress> {
        self.categories
            .iter()
            .flat_map(|c| c.children.iter())
            .find_map(|p| p.find(id))
    }
}

impl ContentProgress {
    fn first_incomplete_leaf(&self) -> Option<&ContentNode> {
        if self.children.is_empty() {
            let leaf = self.node.is_lesson() && self.completed_at.is_none();
            return leaf.then_some(&self.node);
        }
        self.children
            .iter()
            .find_map(ContentProgress::first_incomplete_leaf)
    }

    fn find(&self, id: ContentId) -> Option<&ContentProgress> {
        if self.node.id() == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

//
// ─── AGGREGATION ───────────────────────────────────────────────────────────────
//

/// Annotates `tree` with the completion state described by `marks`.
///
/// Pure: the same tree and marks always give an equal result. Marks for
/// lessons that are not leaves of `tree` have no effect.
#[must_use]
pub fn aggregate(tree: &ContentTree, user_id: UserId, marks: &[ProgressMark]) -> TopicProgress {
    let mut completed: HashMap<ContentId, DateTime<Utc>> = HashMap::new();
    for mark in marks.iter().filter(|m| m.user_id == user_id) {
        if let Some(at) = mark.completed_at {
            completed
                .entry(mark.lesson_id)
                .and_modify(|prev| *prev = (*prev).max(at))
                .or_insert(at);
        }
    }

    let categories: Vec<CategoryProgress> = tree
        .categories()
        .iter()
        .map(|branch| category_progress(branch, &completed))
        .collect();
    let completion = categories.iter().map(|c| c.completion).sum();
    let last_completed_at = categories
        .iter()
        .flat_map(|c| c.children.iter())
        .filter_map(latest_completion)
        .max();

    TopicProgress {
        topic: tree.topic().clone(),
        user_id,
        completion,
        categories,
        last_completed_at,
    }
}

fn category_progress(
    branch: &CategoryBranch,
    completed: &HashMap<ContentId, DateTime<Utc>>,
) -> CategoryProgress {
    let children: Vec<ContentProgress> = branch
        .children()
        .iter()
        .map(|c| content_progress(c, completed))
        .collect();
    CategoryProgress {
        category: branch.category().clone(),
        completion: children.iter().map(|c| c.completion).sum(),
        children,
    }
}

fn content_progress(
    branch: &ContentBranch,
    completed: &HashMap<ContentId, DateTime<Utc>>,
) -> ContentProgress {
    let node = branch.node().clone();
    if branch.is_leaf() {
        let completed_at = completed.get(&node.id()).copied();
        return ContentProgress {
            completion: Completion::new(u32::from(completed_at.is_some()), 1),
            completed_at,
            node,
            children: Vec::new(),
        };
    }

    let children: Vec<ContentProgress> = branch
        .children()
        .iter()
        .map(|c| content_progress(c, completed))
        .collect();
    ContentProgress {
        completion: children.iter().map(|c| c.completion).sum(),
        completed_at: None,
        node,
        children,
    }
}

fn latest_completion(progress: &ContentProgress) -> Option<DateTime<Utc>> {
    progress
        .children
        .iter()
        .filter_map(latest_completion)
        .chain(progress.completed_at)
        .max()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
