//! End-to-end analysis of one post.
//!
//! The [`Analyzer`] pulls the root and its conversation from a
//! [`ConversationSource`], fills in missing labels with the configured
//! classifiers, builds the argument tree, optionally grafts topically related
//! posts under the root, and scores the root.
//!
//! Collaborator failures never abort a run, with one exception: a root whose
//! sentiment cannot be determined stops the analysis with
//! [`TreeError::MissingRootField`](crate::error::TreeError::MissingRootField).

use std::collections::HashMap;

use crate::argumentation::AcceptabilityScorer;
use crate::config::AnalyzerConfig;
use crate::error::AgoraResult;
use crate::export::{AnalysisExport, export};
use crate::metrics::TreeMetrics;
use crate::post::{ArgumentativeType, PostId, PostRecord, Sentiment};
use crate::services::relation::ensure_argument;
use crate::services::{
    ConversationSource, CueRelation, FrequencyKeywords, KeywordExtractor, LexiconSentiment,
    RelationClassifier, SentimentClassifier,
};
use crate::tree::builder::BuildReport;
use crate::tree::{ArgumentTree, TreeBuilder};

/// Outcome of one analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub tree: ArgumentTree,
    pub metrics: TreeMetrics,
    /// Admission counts of the primary thread.
    pub report: BuildReport,
    /// Number of related subtrees grafted under the root.
    pub grafted: usize,
}

impl Analysis {
    /// Serializable view of the tree and its metrics.
    pub fn export(&self) -> AnalysisExport {
        export(&self.tree, &self.metrics)
    }

    /// Acceptability degree of the root.
    pub fn root_acceptability(&self) -> Option<f64> {
        self.metrics.root_argument_strength()
    }
}

/// Wires a conversation source through the classifiers, builder and scorer.
pub struct Analyzer {
    config: AnalyzerConfig,
    sentiment: Box<dyn SentimentClassifier>,
    relation: Box<dyn RelationClassifier>,
    keywords: Box<dyn KeywordExtractor>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl Analyzer {
    /// Analyzer backed by the offline reference collaborators.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            sentiment: Box::new(LexiconSentiment::new()),
            relation: Box::new(CueRelation),
            keywords: Box::new(FrequencyKeywords::new()),
        }
    }

    pub fn with_sentiment(mut self, classifier: impl SentimentClassifier + 'static) -> Self {
        self.sentiment = Box::new(classifier);
        self
    }

    pub fn with_relation(mut self, classifier: impl RelationClassifier + 'static) -> Self {
        self.relation = Box::new(classifier);
        self
    }

    pub fn with_keywords(mut self, extractor: impl KeywordExtractor + 'static) -> Self {
        self.keywords = Box::new(extractor);
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze the post `root_id` as served by `source`.
    pub fn analyze(&self, source: &dyn ConversationSource, root_id: PostId) -> AgoraResult<Analysis> {
        let root = source.fetch_post(root_id)?;
        let thread = source.fetch_conversation(root_id)?;
        tracing::info!(root = %root_id, replies = thread.len(), "analyzing post");

        let root_text = root.text.clone();
        let root = self.label_root(root);
        let replies = self.label_thread(&root_text, root_id, thread);

        let mut metrics = TreeMetrics::new();
        let mut builder = TreeBuilder::new(&mut metrics);
        let mut tree = builder.build(root, replies)?;
        let report = builder.last_report();

        let grafted = if self.config.related.enabled {
            self.graft_related(source, &mut builder, &mut tree, &root_text)
        } else {
            0
        };

        AcceptabilityScorer::new(&mut tree, &mut metrics)
            .with_config(self.config.scoring)
            .score_root()?;

        Ok(Analysis {
            tree,
            metrics,
            report,
            grafted,
        })
    }

    // ── Labeling ────────────────────────────────────────────────────────

    /// Fill in the root's sentiment. On classifier failure the field stays
    /// empty and the builder rejects the root.
    fn label_root(&self, mut root: PostRecord) -> PostRecord {
        if root.sentiment.is_none() {
            match self.sentiment.classify_sentiment(&root.text) {
                Ok(sentiment) => root.sentiment = Some(sentiment),
                Err(e) => {
                    tracing::warn!(post = %root.id, error = %e, "cannot label root sentiment");
                }
            }
        }
        root
    }

    fn sentiment_or_neutral(&self, record: &PostRecord) -> Sentiment {
        self.sentiment
            .classify_sentiment(&record.text)
            .unwrap_or_else(|e| {
                tracing::warn!(post = %record.id, error = %e, "sentiment unavailable, using neutral");
                Sentiment::Neutral
            })
    }

    fn relation_or_neutral(&self, id: PostId, parent_text: &str, text: &str) -> ArgumentativeType {
        self.relation
            .classify_relation(parent_text, text)
            .and_then(|label| ensure_argument(self.relation.name(), label))
            .unwrap_or_else(|e| {
                tracing::warn!(post = %id, error = %e, "relation unavailable, using neutral");
                ArgumentativeType::Neutral
            })
    }

    /// Fill in missing labels on the replies of one conversation.
    ///
    /// Only replies the builder will attach are classified: walking in id
    /// order, a reply is reachable when its parent is the root or an earlier
    /// reachable reply. The parent text comes from the reply's own reference
    /// when present, otherwise from the reachable posts. Everything else is
    /// returned unlabeled and the builder drops it.
    fn label_thread(&self, root_text: &str, root_id: PostId, mut thread: Vec<PostRecord>) -> Vec<PostRecord> {
        thread.sort_by_key(|r| r.id);
        let mut texts: HashMap<PostId, String> = HashMap::new();
        texts.insert(root_id, root_text.to_string());

        for reply in &mut thread {
            let Some(parent) = reply.parent_id() else {
                continue;
            };
            if !texts.contains_key(&parent) || texts.contains_key(&reply.id) {
                tracing::trace!(reply = %reply.id, "unreachable reply, not labeling");
                continue;
            }
            if reply.sentiment.is_none() {
                reply.sentiment = Some(self.sentiment_or_neutral(reply));
            }
            if reply.argumentative_type.is_none() {
                let parent_text = match reply.parent_text() {
                    Some(text) if !text.is_empty() => text.to_string(),
                    _ => texts.get(&parent).cloned().unwrap_or_default(),
                };
                reply.argumentative_type =
                    Some(self.relation_or_neutral(reply.id, &parent_text, &reply.text));
            }
            texts.insert(reply.id, reply.text.clone());
        }
        thread
    }

    // ── Related posts ───────────────────────────────────────────────────

    /// Search posts about the root's top keyword and graft each fresh one,
    /// with its own conversation, under the root. Returns the graft count.
    fn graft_related(
        &self,
        source: &dyn ConversationSource,
        builder: &mut TreeBuilder<'_>,
        tree: &mut ArgumentTree,
        root_text: &str,
    ) -> usize {
        let keyword = match self.keywords.extract_top_keyword(root_text) {
            Ok(keyword) => keyword,
            Err(e) => {
                tracing::warn!(error = %e, "no keyword for related search, skipping grafts");
                return 0;
            }
        };
        let max_posts = self.config.related.max_posts;
        let candidates = match source.search_related(&keyword, max_posts) {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(keyword = %keyword, error = %e, "related search failed, skipping grafts");
                return 0;
            }
        };

        let root_id = tree.root_id();
        let mut grafted = 0;
        for candidate in candidates
            .into_iter()
            .filter(|p| p.is_fresh() && p.id != root_id)
            .take(max_posts)
        {
            let id = candidate.id;
            if tree.contains(id) {
                tracing::debug!(post = %id, "related post already in tree");
                continue;
            }
            let thread = match source.fetch_conversation(id) {
                Ok(thread) => thread,
                Err(e) => {
                    tracing::warn!(post = %id, error = %e, "skipping related post");
                    continue;
                }
            };

            let relation = self.relation_or_neutral(id, root_text, &candidate.text);
            let mut sub_root = candidate;
            if sub_root.sentiment.is_none() {
                sub_root.sentiment = Some(self.sentiment_or_neutral(&sub_root));
            }
            let sub_text = sub_root.text.clone();
            let mut replies = self.label_thread(&sub_text, id, thread);
            replies.retain(|r| !tree.contains(r.id));

            let result = builder
                .build_subtree(sub_root, relation, replies)
                .and_then(|staged| builder.graft(tree, staged));
            match result {
                Ok(()) => grafted += 1,
                Err(e) => tracing::warn!(post = %id, error = %e, "graft failed, skipping"),
            }
        }

        tracing::info!(keyword = %keyword, grafted, "grafted related posts");
        grafted
    }
}
