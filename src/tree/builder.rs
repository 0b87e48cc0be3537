//! Builds argument trees from a root post and its labeled replies.
//!
//! Replies are admitted in ascending id order, so a reply is always considered
//! after the post it answers. A reply is admitted only if its parent is
//! already in the tree; everything else (replies to deleted posts, unlabeled
//! or duplicate records) is dropped without error.

use crate::error::{TreeError, TreeResult};
use crate::metrics::TreeMetrics;
use crate::post::{ArgumentativeType, Post, PostId, PostRecord};

use super::{ArgumentTree, EdgeKind};

/// Why a reply was left out of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The record references no parent at all.
    NoParent,
    /// The parent is not in the tree (deleted, or outside the thread).
    Orphan,
    /// A post with the same id is already in the tree.
    Duplicate,
    /// Sentiment or relation label missing, or the reply claims `none`.
    Unlabeled,
}

/// Outcome counts of one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub admitted: usize,
    pub dropped: usize,
}

/// A subtree built but not yet part of the primary tree.
///
/// Holds the engagement and sentiment samples of its posts apart from the
/// shared aggregator; they are committed by [`TreeBuilder::graft`] only once
/// the graft has succeeded.
#[derive(Debug, Clone)]
pub struct StagedSubtree {
    tree: ArgumentTree,
    samples: TreeMetrics,
}

impl StagedSubtree {
    pub fn root_id(&self) -> PostId {
        self.tree.root_id()
    }

    pub fn tree(&self) -> &ArgumentTree {
        &self.tree
    }

    /// Samples that a successful graft adds to the shared aggregator.
    pub fn samples(&self) -> &TreeMetrics {
        &self.samples
    }
}

/// Tree builder feeding a shared [`TreeMetrics`].
///
/// The same builder (and so the same aggregator) is used for the primary tree
/// and for any subtree later grafted onto it.
pub struct TreeBuilder<'m> {
    metrics: &'m mut TreeMetrics,
    last_report: BuildReport,
}

impl<'m> TreeBuilder<'m> {
    pub fn new(metrics: &'m mut TreeMetrics) -> Self {
        Self {
            metrics,
            last_report: BuildReport::default(),
        }
    }

    /// Counts from the most recent `build`/`build_subtree` call.
    pub fn last_report(&self) -> BuildReport {
        self.last_report
    }

    /// Build the primary tree for the post under analysis.
    ///
    /// The root must carry its sentiment and must either leave the relation
    /// label empty or declare it `none`. Its engagement is not recorded: the
    /// root's base strength is fixed, so it stays out of normalization.
    pub fn build(&mut self, root: PostRecord, replies: Vec<PostRecord>) -> TreeResult<ArgumentTree> {
        let root_id = root.id;
        match root.argumentative_type {
            None | Some(ArgumentativeType::None) => {}
            Some(found) => {
                return Err(TreeError::RootNotNone {
                    id: root_id.to_string(),
                    found,
                });
            }
        }
        let root = labeled_root(root, ArgumentativeType::None)?;

        self.metrics.set_root_sentiment(root.sentiment);
        let mut tree = ArgumentTree::with_root(root);
        self.last_report = admit(self.metrics, &mut tree, replies, Some(root_id));
        Ok(tree)
    }

    /// Build an independently sourced subtree to graft under the primary root.
    ///
    /// `relation` is the subtree root's relation towards the primary root and
    /// must not be `none`. The subtree root counts as a regular (non-root) post
    /// for engagement bounds and general sentiment, but nothing reaches the
    /// shared aggregator until [`graft`](Self::graft) succeeds.
    pub fn build_subtree(
        &mut self,
        root: PostRecord,
        relation: ArgumentativeType,
        replies: Vec<PostRecord>,
    ) -> TreeResult<StagedSubtree> {
        if relation.is_root() {
            return Err(TreeError::SubtreeRootNone {
                id: root.id.to_string(),
            });
        }
        let root = labeled_root(root, relation)?;

        let mut samples = TreeMetrics::new();
        samples.record_engagement(&root);
        samples.record_sentiment(root.sentiment, false);
        let mut tree = ArgumentTree::with_root(root);
        self.last_report = admit(&mut samples, &mut tree, replies, None);
        Ok(StagedSubtree { tree, samples })
    }

    /// Graft a staged subtree under `tree`'s root and commit its samples.
    ///
    /// On error both the tree and the shared aggregator are left untouched.
    pub fn graft(&mut self, tree: &mut ArgumentTree, staged: StagedSubtree) -> TreeResult<()> {
        let StagedSubtree { tree: subtree, samples } = staged;
        let sub_root = subtree.root_id();
        tree.graft(subtree)?;
        self.metrics.absorb(&samples);
        tracing::debug!(root = %tree.root_id(), subtree = %sub_root, "grafted subtree");
        Ok(())
    }
}

fn admit(
    metrics: &mut TreeMetrics,
    tree: &mut ArgumentTree,
    mut replies: Vec<PostRecord>,
    analysis_root: Option<PostId>,
) -> BuildReport {
    replies.sort_by_key(|r| r.id);

    let mut report = BuildReport::default();
    for reply in replies {
        let reply_id = reply.id;
        match admit_one(metrics, tree, reply, analysis_root) {
            Ok(()) => report.admitted += 1,
            Err(reason) => {
                tracing::debug!(reply = %reply_id, ?reason, "dropping reply");
                report.dropped += 1;
            }
        }
    }

    tracing::info!(
        root = %tree.root_id(),
        admitted = report.admitted,
        dropped = report.dropped,
        "built argument tree"
    );
    report
}

fn admit_one(
    metrics: &mut TreeMetrics,
    tree: &mut ArgumentTree,
    reply: PostRecord,
    analysis_root: Option<PostId>,
) -> Result<(), DropReason> {
    let parent = reply.parent_id().ok_or(DropReason::NoParent)?;
    if !tree.contains(parent) {
        return Err(DropReason::Orphan);
    }
    if tree.contains(reply.id) {
        return Err(DropReason::Duplicate);
    }
    let post = reply.into_post().ok_or(DropReason::Unlabeled)?;
    if post.argumentative_type.is_root() {
        return Err(DropReason::Unlabeled);
    }

    metrics.record_engagement(&post);
    metrics.record_sentiment(post.sentiment, Some(parent) == analysis_root);
    tree.attach(parent, post, EdgeKind::Reply);
    Ok(())
}

/// Turn a root record into node attributes, failing on missing labels.
fn labeled_root(root: PostRecord, argumentative_type: ArgumentativeType) -> TreeResult<Post> {
    let sentiment = root
        .sentiment
        .ok_or(TreeError::MissingRootField { field: "sentiment" })?;
    Ok(Post::new(
        root.id,
        root.text,
        root.public_metrics,
        sentiment,
        argumentative_type,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::{PublicMetrics, Sentiment};

    fn root() -> PostRecord {
        PostRecord::new(0u64, "Python is a superb programming language", PublicMetrics::new(3, 1))
            .with_sentiment(Sentiment::Positive)
    }

    fn reply(id: u64, parent: u64, likes: u64, sentiment: Sentiment) -> PostRecord {
        PostRecord::new(id, format!("reply {id}"), PublicMetrics::new(likes, 0))
            .replying_to(parent, format!("post {parent}"))
            .with_sentiment(sentiment)
            .with_type(ArgumentativeType::Support)
    }

    #[test]
    fn admits_replies_and_drops_deleted_parent() {
        let mut metrics = TreeMetrics::new();
        let thread = vec![
            reply(1, 0, 2, Sentiment::Positive),
            reply(2, 150, 0, Sentiment::Neutral),
            reply(3, 1, 1, Sentiment::Positive),
        ];

        let mut builder = TreeBuilder::new(&mut metrics);
        let tree = builder.build(root(), thread).unwrap();
        assert_eq!(builder.last_report(), BuildReport { admitted: 2, dropped: 1 });

        assert_eq!(tree.len(), 3);
        assert!(!tree.contains(PostId(2)));
        assert!(tree.posts().all(|p| p.id != PostId(2)));
        assert_eq!(tree.children(PostId(0)).collect::<Vec<_>>(), vec![PostId(1)]);
        assert_eq!(tree.children(PostId(1)).collect::<Vec<_>>(), vec![PostId(3)]);

        assert_eq!(metrics.root_sentiment(), Some(Sentiment::Positive));
        assert_eq!(metrics.towards_root_counts().positive, 1);
        assert_eq!(metrics.general_counts().positive, 1);
        assert_eq!(metrics.max_score(), Some(2));
        assert_eq!(metrics.min_score(), Some(1));
    }

    #[test]
    fn sorts_replies_before_admitting() {
        let mut metrics = TreeMetrics::new();
        // The reply-to-reply arrives first; it must still find its parent.
        let thread = vec![
            reply(7, 5, 1, Sentiment::Negative),
            reply(5, 0, 1, Sentiment::Neutral),
        ];

        let tree = TreeBuilder::new(&mut metrics).build(root(), thread).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.children(PostId(5)).collect::<Vec<_>>(), vec![PostId(7)]);
    }

    #[test]
    fn root_engagement_stays_out_of_bounds() {
        let mut metrics = TreeMetrics::new();
        let tree = TreeBuilder::new(&mut metrics).build(root(), Vec::new()).unwrap();

        assert_eq!(tree.len(), 1);
        assert!(metrics.bounds().is_none());
        assert_eq!(tree.root().argumentative_type, ArgumentativeType::None);
    }

    #[test]
    fn drops_unlabeled_duplicate_and_parentless_replies() {
        let mut metrics = TreeMetrics::new();
        let unlabeled = PostRecord::new(4u64, "?", PublicMetrics::new(0, 0)).replying_to(0u64, "");
        let parentless = PostRecord::new(6u64, "loose", PublicMetrics::new(0, 0))
            .with_sentiment(Sentiment::Neutral)
            .with_type(ArgumentativeType::Attack);
        let claims_root = reply(8, 0, 0, Sentiment::Neutral).with_type(ArgumentativeType::None);
        let thread = vec![
            reply(1, 0, 1, Sentiment::Neutral),
            reply(1, 0, 9, Sentiment::Negative),
            unlabeled,
            parentless,
            claims_root,
        ];

        let mut builder = TreeBuilder::new(&mut metrics);
        let tree = builder.build(root(), thread).unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(builder.last_report(), BuildReport { admitted: 1, dropped: 4 });
        assert_eq!(tree.get(PostId(1)).unwrap().sentiment, Sentiment::Neutral);
        assert_eq!(metrics.max_score(), Some(1));
    }

    #[test]
    fn root_without_sentiment_fails_fast() {
        let mut metrics = TreeMetrics::new();
        let bare = PostRecord::new(0u64, "no label", PublicMetrics::new(0, 0));

        let err = TreeBuilder::new(&mut metrics).build(bare, Vec::new()).unwrap_err();
        assert!(matches!(err, TreeError::MissingRootField { field: "sentiment" }));
    }

    #[test]
    fn root_with_relation_label_is_rejected() {
        let mut metrics = TreeMetrics::new();
        let labeled = root().with_type(ArgumentativeType::Support);

        let err = TreeBuilder::new(&mut metrics).build(labeled, Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            TreeError::RootNotNone {
                found: ArgumentativeType::Support,
                ..
            }
        ));
    }

    #[test]
    fn subtree_feeds_general_sentiment_and_bounds() {
        let mut metrics = TreeMetrics::new();
        let mut builder = TreeBuilder::new(&mut metrics);
        let mut tree = builder.build(root(), vec![reply(1, 0, 4, Sentiment::Positive)]).unwrap();

        let related = PostRecord::new(20u64, "pizza is great", PublicMetrics::new(40, 10))
            .with_sentiment(Sentiment::Negative);
        let staged = builder
            .build_subtree(
                related,
                ArgumentativeType::Support,
                vec![reply(21, 20, 2, Sentiment::Negative)],
            )
            .unwrap();
        assert_eq!(staged.samples().max_score(), Some(50));
        builder.graft(&mut tree, staged).unwrap();

        assert_eq!(tree.len(), 4);
        assert_eq!(
            tree.get(PostId(20)).unwrap().argumentative_type,
            ArgumentativeType::Support
        );
        assert_eq!(metrics.towards_root_counts().total(), 1);
        assert_eq!(metrics.general_counts().negative, 2);
        assert_eq!(metrics.max_score(), Some(50));
        assert_eq!(metrics.min_score(), Some(2));
    }

    #[test]
    fn subtree_root_must_be_an_argument() {
        let mut metrics = TreeMetrics::new();
        let err = TreeBuilder::new(&mut metrics)
            .build_subtree(root(), ArgumentativeType::None, Vec::new())
            .unwrap_err();
        assert!(matches!(err, TreeError::SubtreeRootNone { .. }));
    }

    #[test]
    fn staged_subtree_stays_out_of_metrics_until_grafted() {
        let mut metrics = TreeMetrics::new();
        let mut builder = TreeBuilder::new(&mut metrics);
        let tree = builder.build(root(), vec![reply(1, 0, 5, Sentiment::Positive)]).unwrap();

        let related = PostRecord::new(30u64, "pizza", PublicMetrics::new(60, 0))
            .with_sentiment(Sentiment::Negative);
        let staged = builder
            .build_subtree(related, ArgumentativeType::Attack, Vec::new())
            .unwrap();
        drop(staged);
        drop(builder);

        assert_eq!(tree.len(), 2);
        assert_eq!(metrics.max_score(), Some(5));
        assert_eq!(metrics.general_counts().total(), 0);
    }

    #[test]
    fn failed_graft_leaves_metrics_untouched() {
        let mut metrics = TreeMetrics::new();
        let mut builder = TreeBuilder::new(&mut metrics);
        let mut tree = builder.build(root(), vec![reply(1, 0, 5, Sentiment::Positive)]).unwrap();

        // The related thread reuses id 1, already in the primary tree.
        let related = PostRecord::new(40u64, "popular", PublicMetrics::new(8_000, 1_000))
            .with_sentiment(Sentiment::Negative);
        let staged = builder
            .build_subtree(
                related,
                ArgumentativeType::Support,
                vec![reply(1, 40, 3, Sentiment::Negative)],
            )
            .unwrap();

        let err = builder.graft(&mut tree, staged).unwrap_err();
        assert!(matches!(err, TreeError::GraftOverlap { .. }));
        drop(builder);

        assert_eq!(tree.len(), 2);
        assert_eq!(metrics.max_score(), Some(5));
        assert_eq!(metrics.min_score(), Some(5));
        assert_eq!(metrics.general_counts().total(), 0);
        assert_eq!(metrics.towards_root_counts().total(), 1);
    }
}
