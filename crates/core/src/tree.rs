//! Assembly of a topic's flat rows into an ordered content tree.
//!
//! Categories form the first level. Content nodes hang under a category or
//! under another content node, to any depth. Siblings are ordered by
//! `(display_order, id)` so the same rows always produce the same tree,
//! whatever order they arrived in.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ingest::TopicRows;
use crate::model::{Category, CategoryId, ContentId, ContentNode, Diagnostic, ParentRef, Topic};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StructuralError {
    /// `path` lists the nodes of the cycle, starting and ending with the
    /// node that was revisited.
    #[error("cyclic parent reference at content {at}")]
    Cycle { at: ContentId, path: Vec<ContentId> },
}

//
// ─── TREE ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBranch {
    node: ContentNode,
    children: Vec<ContentBranch>,
}

impl ContentBranch {
    #[must_use]
    pub fn node(&self) -> &ContentNode {
        &self.node
    }

    #[must_use]
    pub fn children(&self) -> &[ContentBranch] {
        &self.children
    }

    /// A lesson with nothing below it; the unit progress is counted in.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.node.is_lesson() && self.children.is_empty()
    }

    fn find(&self, id: ContentId) -> Option<&ContentBranch> {
        if self.node.id() == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ContentNode>) {
        if self.is_leaf() {
            out.push(&self.node);
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(ContentBranch::count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBranch {
    category: Category,
    children: Vec<ContentBranch>,
}

impl CategoryBranch {
    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }

    #[must_use]
    pub fn children(&self) -> &[ContentBranch] {
        &self.children
    }
}

/// Ordered hierarchy for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTree {
    topic: Topic,
    categories: Vec<CategoryBranch>,
}

impl ContentTree {
    #[must_use]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    #[must_use]
    pub fn categories(&self) -> &[CategoryBranch] {
        &self.categories
    }

    /// True when the topic has no categories yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of content nodes in the tree, at any depth.
    #[must_use]
    pub fn content_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| c.children.iter())
            .map(ContentBranch::count)
            .sum()
    }

    #[must_use]
    pub fn find(&self, id: ContentId) -> Option<&ContentBranch> {
        self.categories
            .iter()
            .flat_map(|c| c.children.iter())
            .find_map(|b| b.find(id))
    }

    /// Leaf lessons in reading order.
    #[must_use]
    pub fn leaf_lessons(&self) -> Vec<&ContentNode> {
        let mut out = Vec::new();
        for branch in self.categories.iter().flat_map(|c| c.children.iter()) {
            branch.collect_leaves(&mut out);
        }
        out
    }
}

/// A tree together with the notes about rows it had to leave out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltTree {
    pub tree: ContentTree,
    pub diagnostics: Vec<Diagnostic>,
}

//
// ─── BUILDER ───────────────────────────────────────────────────────────────────
//

pub struct TreeBuilder {
    by_category: HashMap<CategoryId, Vec<ContentNode>>,
    by_content: HashMap<ContentId, Vec<ContentNode>>,
    parents: HashMap<ContentId, ParentRef>,
    attached: HashSet<ContentId>,
    path: Vec<ContentId>,
}

impl TreeBuilder {
    /// Builds the tree for already-ingested rows.
    ///
    /// # Errors
    ///
    /// Returns `StructuralError::Cycle` if any content node is its own
    /// ancestor; no partial tree is returned.
    pub fn build(rows: TopicRows) -> Result<BuiltTree, StructuralError> {
        let (topic, mut categories, contents) = rows.into_parts();
        categories.sort_by_key(Category::sort_key);

        let mut builder = Self {
            by_category: HashMap::new(),
            by_content: HashMap::new(),
            parents: contents.iter().map(|n| (n.id(), n.parent())).collect(),
            attached: HashSet::new(),
            path: Vec::new(),
        };
        for node in contents {
            match node.parent() {
                ParentRef::Category(id) => builder.by_category.entry(id).or_default().push(node),
                ParentRef::Content(id) => builder.by_content.entry(id).or_default().push(node),
            }
        }
        for siblings in builder
            .by_category
            .values_mut()
            .chain(builder.by_content.values_mut())
        {
            siblings.sort_by_key(ContentNode::sort_key);
        }

        let mut branches = Vec::with_capacity(categories.len());
        for category in categories {
            let children = builder
                .by_category
                .remove(&category.id())
                .unwrap_or_default();
            let children = builder.attach_all(children)?;
            branches.push(CategoryBranch { category, children });
        }

        let diagnostics = builder.unattached_diagnostics()?;

        Ok(BuiltTree {
            tree: ContentTree {
                topic,
                categories: branches,
            },
            diagnostics,
        })
    }

    fn attach_all(&mut self, nodes: Vec<ContentNode>) -> Result<Vec<ContentBranch>, StructuralError> {
        let mut branches = Vec::with_capacity(nodes.len());
        for node in nodes {
            branches.push(self.attach(node)?);
        }
        Ok(branches)
    }

    fn attach(&mut self, node: ContentNode) -> Result<ContentBranch, StructuralError> {
        let id = node.id();
        if let Some(start) = self.path.iter().position(|p| *p == id) {
            let mut path = self.path[start..].to_vec();
            path.push(id);
            return Err(StructuralError::Cycle { at: id, path });
        }

        self.path.push(id);
        self.attached.insert(id);
        let children = self.by_content.remove(&id).unwrap_or_default();
        let children = self.attach_all(children)?;
        self.path.pop();

        Ok(ContentBranch { node, children })
    }

    /// Everything still unattached is either part of a cycle (fatal) or hangs
    /// below a parent that is not in the active set (an orphan).
    fn unattached_diagnostics(&self) -> Result<Vec<Diagnostic>, StructuralError> {
        let mut leftover: Vec<(ContentId, ParentRef)> = self
            .by_category
            .values()
            .chain(self.by_content.values())
            .flatten()
            .filter(|n| !self.attached.contains(&n.id()))
            .map(|n| (n.id(), n.parent()))
            .collect();
        leftover.sort_by_key(|(id, _)| *id);

        let mut diagnostics = Vec::with_capacity(leftover.len());
        for (content_id, parent) in leftover {
            let missing_parent = self.unresolved_ancestor(content_id, parent)?;
            diagnostics.push(Diagnostic::OrphanedContent {
                content_id,
                missing_parent,
            });
        }
        Ok(diagnostics)
    }

    /// Walks up from `start` until a parent is not among the active nodes.
    fn unresolved_ancestor(
        &self,
        start: ContentId,
        mut parent: ParentRef,
    ) -> Result<ParentRef, StructuralError> {
        let mut chain = vec![start];
        while let ParentRef::Content(id) = parent {
            let Some(next) = self.parents.get(&id) else {
                break;
            };
            if let Some(pos) = chain.iter().position(|c| *c == id) {
                let mut path = chain[pos..].to_vec();
                path.push(id);
                return Err(StructuralError::Cycle { at: id, path });
            }
            chain.push(id);
            parent = *next;
        }
        Ok(parent)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
