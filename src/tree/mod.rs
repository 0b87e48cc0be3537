//! Argument tree: a rooted, directed tree of posts.
//!
//! Edges point from the replied-to post (parent) to the reply (child). Storage
//! is an explicit adjacency structure: one map from id to node attributes and
//! one map from id to the ordered list of outgoing edges. Child order is
//! insertion order, which keeps every traversal (and therefore the
//! floating-point accumulation order of the scorer) reproducible.

pub mod builder;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{TreeError, TreeResult};
use crate::post::{Post, PostId};

pub use builder::{StagedSubtree, TreeBuilder};

// ── EdgeKind ────────────────────────────────────────────────────────────

/// How a child was attached to its parent.
///
/// Only rendering cares about the distinction; scoring treats every edge the
/// same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// An organic reply in the conversation thread.
    Reply,
    /// A synthetic root-to-root edge attaching an independently sourced subtree.
    Related,
}

/// An outgoing edge of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildEdge {
    pub id: PostId,
    pub kind: EdgeKind,
}

// ── ArgumentTree ────────────────────────────────────────────────────────

/// A rooted tree of posts linked by reply (and graft) edges.
#[derive(Debug, Clone)]
pub struct ArgumentTree {
    root: PostId,
    nodes: HashMap<PostId, Post>,
    edges: HashMap<PostId, Vec<ChildEdge>>,
}

impl ArgumentTree {
    /// Create a single-node tree rooted at `root`.
    pub(crate) fn with_root(root: Post) -> Self {
        let id = root.id;
        let mut nodes = HashMap::new();
        nodes.insert(id, root);
        Self {
            root: id,
            nodes,
            edges: HashMap::new(),
        }
    }

    /// Id of the designated root.
    pub fn root_id(&self) -> PostId {
        self.root
    }

    /// Attributes of the designated root.
    pub fn root(&self) -> &Post {
        // The root is inserted on construction and nodes are never removed.
        &self.nodes[&self.root]
    }

    pub fn get(&self, id: PostId) -> Option<&Post> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: PostId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of posts in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges (every node but the root has exactly one incoming edge).
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Outgoing edges of `id`, in insertion order.
    pub fn edges(&self, id: PostId) -> &[ChildEdge] {
        self.edges.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids of the children of `id`, in insertion order.
    pub fn children(&self, id: PostId) -> impl Iterator<Item = PostId> + '_ {
        self.edges(id).iter().map(|e| e.id)
    }

    /// The `index`-th outgoing edge of `id`, if any.
    pub fn edge_at(&self, id: PostId, index: usize) -> Option<ChildEdge> {
        self.edges(id).get(index).copied()
    }

    /// All posts, in no particular order.
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.nodes.values()
    }

    /// Attach `post` under `parent`.
    ///
    /// Refuses (returns `false`) when the parent is unknown or the post id is
    /// already present; either would break the tree shape.
    pub(crate) fn attach(&mut self, parent: PostId, post: Post, kind: EdgeKind) -> bool {
        if !self.nodes.contains_key(&parent) || self.nodes.contains_key(&post.id) {
            return false;
        }
        let id = post.id;
        self.nodes.insert(id, post);
        self.edges.entry(parent).or_default().push(ChildEdge { id, kind });
        true
    }

    /// Write the acceptability degree of `id`. Returns `false` for unknown ids.
    pub(crate) fn set_acceptability(&mut self, id: PostId, degree: f64) -> bool {
        match self.nodes.get_mut(&id) {
            Some(post) => {
                post.acceptability = Some(degree);
                true
            }
            None => false,
        }
    }

    /// Compose `subtree` into this tree and link its root under ours.
    ///
    /// Both trees keep their internal edges; one extra [`EdgeKind::Related`]
    /// edge runs from this tree's root to the subtree's root. The subtree's
    /// root must be an argument (not `none`) and no post may appear in both
    /// trees; on error this tree is left untouched.
    pub fn graft(&mut self, subtree: ArgumentTree) -> TreeResult<()> {
        let sub_root = subtree.root_id();
        if subtree.root().argumentative_type.is_root() {
            return Err(TreeError::SubtreeRootNone {
                id: sub_root.to_string(),
            });
        }
        if let Some(dup) = subtree.nodes.keys().find(|id| self.nodes.contains_key(*id)) {
            return Err(TreeError::GraftOverlap {
                id: dup.to_string(),
            });
        }

        let ArgumentTree { nodes, edges, .. } = subtree;
        self.nodes.extend(nodes);
        self.edges.extend(edges);
        self.edges.entry(self.root).or_default().push(ChildEdge {
            id: sub_root,
            kind: EdgeKind::Related,
        });
        Ok(())
    }

    /// Length of the longest root-to-leaf path, counted in edges.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            for child in self.children(id) {
                stack.push((child, depth + 1));
            }
        }
        deepest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::{ArgumentativeType, PublicMetrics, Sentiment};

    fn post(id: u64, kind: ArgumentativeType) -> Post {
        Post::new(id, format!("post {id}"), PublicMetrics::new(id, 0), Sentiment::Neutral, kind)
    }

    fn chain() -> ArgumentTree {
        // 0 → 1 → 2, 0 → 3
        let mut tree = ArgumentTree::with_root(post(0, ArgumentativeType::None));
        assert!(tree.attach(PostId(0), post(1, ArgumentativeType::Support), EdgeKind::Reply));
        assert!(tree.attach(PostId(1), post(2, ArgumentativeType::Attack), EdgeKind::Reply));
        assert!(tree.attach(PostId(0), post(3, ArgumentativeType::Neutral), EdgeKind::Reply));
        tree
    }

    #[test]
    fn lookup_and_children() {
        let tree = chain();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.edge_count(), 3);
        assert_eq!(tree.root_id(), PostId(0));
        assert_eq!(tree.children(PostId(0)).collect::<Vec<_>>(), vec![PostId(1), PostId(3)]);
        assert_eq!(tree.children(PostId(2)).count(), 0);
        assert_eq!(tree.get(PostId(2)).unwrap().argumentative_type, ArgumentativeType::Attack);
        assert!(tree.get(PostId(99)).is_none());
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn attach_refuses_unknown_parent_and_duplicates() {
        let mut tree = chain();
        assert!(!tree.attach(PostId(42), post(5, ArgumentativeType::Support), EdgeKind::Reply));
        assert!(!tree.attach(PostId(0), post(2, ArgumentativeType::Support), EdgeKind::Reply));
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.edge_count(), 3);
    }

    #[test]
    fn graft_keeps_both_edge_sets_and_links_roots() {
        let mut tree = chain();
        let mut related = ArgumentTree::with_root(post(10, ArgumentativeType::Support));
        related.attach(PostId(10), post(11, ArgumentativeType::Attack), EdgeKind::Reply);

        tree.graft(related).unwrap();

        assert_eq!(tree.len(), 6);
        assert_eq!(tree.edge_count(), 5);
        assert_eq!(
            tree.edges(PostId(0)).last(),
            Some(&ChildEdge {
                id: PostId(10),
                kind: EdgeKind::Related
            })
        );
        assert_eq!(tree.children(PostId(10)).collect::<Vec<_>>(), vec![PostId(11)]);
    }

    #[test]
    fn graft_rejects_overlap_and_root_typed_subtrees() {
        let mut tree = chain();

        let overlapping = ArgumentTree::with_root(post(2, ArgumentativeType::Support));
        assert!(matches!(tree.graft(overlapping), Err(TreeError::GraftOverlap { .. })));

        let rooted = ArgumentTree::with_root(post(20, ArgumentativeType::None));
        assert!(matches!(tree.graft(rooted), Err(TreeError::SubtreeRootNone { .. })));

        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn set_acceptability_only_touches_known_nodes() {
        let mut tree = chain();
        assert!(tree.set_acceptability(PostId(1), 0.7));
        assert!(!tree.set_acceptability(PostId(77), 0.7));
        assert_eq!(tree.get(PostId(1)).unwrap().acceptability, Some(0.7));
    }
}
