//! Export types for serializing an analysed tree.
//!
//! The tree is exported as a nested structure (children under parents), not
//! as an edge list, together with the aggregated metrics. The layout is the
//! one the presentation layer renders directly.

use serde::{Deserialize, Serialize};

use crate::metrics::TreeMetrics;
use crate::post::{Post, PostId, Sentiment};
use crate::tree::{ArgumentTree, EdgeKind};

/// Exported node with its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeExport {
    /// Node attributes, including the acceptability degree once scored.
    pub attributes: Post,
    /// The post id, used by renderers as the node label.
    pub name: PostId,
    /// How this node hangs under its parent. Absent on the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge: Option<EdgeKind>,
    /// Child subtrees in tree order.
    pub children: Vec<NodeExport>,
}

/// Exported aggregate metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsExport {
    pub root_tweet_sentiment: Option<Sentiment>,
    pub root_tweet_argument_strength: Option<f64>,
    pub strongest_argument_id: Option<PostId>,
    pub sentiment_towards_root: Sentiment,
    pub general_sentiment: Sentiment,
}

/// Complete analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisExport {
    pub tweet_tree: NodeExport,
    pub metrics: MetricsExport,
}

impl MetricsExport {
    pub fn from_metrics(metrics: &TreeMetrics) -> Self {
        Self {
            root_tweet_sentiment: metrics.root_sentiment(),
            root_tweet_argument_strength: metrics.root_argument_strength(),
            strongest_argument_id: metrics.strongest_argument_id(),
            sentiment_towards_root: metrics.sentiment_towards_root(),
            general_sentiment: metrics.general_sentiment(),
        }
    }
}

/// Partially assembled node while walking the tree.
struct Pending {
    attributes: Post,
    edge: Option<EdgeKind>,
    next_child: usize,
    children: Vec<NodeExport>,
}

impl Pending {
    fn new(attributes: Post, edge: Option<EdgeKind>) -> Self {
        Self {
            attributes,
            edge,
            next_child: 0,
            children: Vec::new(),
        }
    }

    fn finish(self) -> NodeExport {
        NodeExport {
            name: self.attributes.id,
            attributes: self.attributes,
            edge: self.edge,
            children: self.children,
        }
    }
}

impl NodeExport {
    /// Nest the tree under its root.
    ///
    /// Walks with an explicit stack, so deep reply chains are safe; the result
    /// depends only on the tree, never on hash-map iteration order.
    pub fn from_tree(tree: &ArgumentTree) -> Self {
        let mut root = Pending::new(tree.root().clone(), None);
        let mut path: Vec<Pending> = Vec::new();

        loop {
            let top = path.last_mut().unwrap_or(&mut root);
            if let Some(edge) = tree.edge_at(top.attributes.id, top.next_child) {
                top.next_child += 1;
                if let Some(post) = tree.get(edge.id) {
                    path.push(Pending::new(post.clone(), Some(edge.kind)));
                }
                continue;
            }

            match path.pop() {
                Some(done) => path
                    .last_mut()
                    .unwrap_or(&mut root)
                    .children
                    .push(done.finish()),
                None => return root.finish(),
            }
        }
    }

    /// Number of nodes in this subtree.
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Export a tree and its metrics.
pub fn export(tree: &ArgumentTree, metrics: &TreeMetrics) -> AnalysisExport {
    AnalysisExport {
        tweet_tree: NodeExport::from_tree(tree),
        metrics: MetricsExport::from_metrics(metrics),
    }
}
