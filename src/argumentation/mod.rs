//! Gradual argumentation: acceptability degrees over an argument tree.
//!
//! Every argument's degree combines its own base strength (engagement
//! normalized against the whole tree) with the net strength of its children:
//!
//! ```text
//! degree = 1 − (1 − base²) / (1 + base · 2^(supporters − attackers))
//! ```
//!
//! The valuation is computed bottom-up in a single post-order pass. The walk
//! uses an explicit stack instead of recursion so that arbitrarily deep reply
//! chains cannot overflow the call stack; children are visited in tree order,
//! so sums accumulate exactly as a recursive walk would.
//!
//! # Architecture
//!
//! - [`ScoringConfig`]: the root's fixed base strength and the ε guard
//! - [`base_strength`]: intrinsic credibility of one post
//! - [`acceptability_from`]: the valuation function itself
//! - [`AcceptabilityScorer`]: the tree walk, writing degrees back to the tree
//!   and reporting candidates to [`TreeMetrics`]

use serde::{Deserialize, Serialize};

use crate::error::{ScoreError, ScoreResult};
use crate::metrics::{NormalizationBounds, TreeMetrics};
use crate::post::{ArgumentativeType, Post, PostId};
use crate::tree::ArgumentTree;

/// Base strength of the post under analysis.
pub const ROOT_BASE_STRENGTH: f64 = 0.5;

/// Added to every normalized engagement so no argument has zero strength.
pub const EPSILON: f64 = 0.000001;

// ---------------------------------------------------------------------------
// ScoringConfig
// ---------------------------------------------------------------------------

/// Tunable constants of the valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Base strength assigned to the `none` root instead of its engagement.
    #[serde(default = "default_root_base_strength")]
    pub root_base_strength: f64,
    /// ε added to normalized engagement.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

fn default_root_base_strength() -> f64 {
    ROOT_BASE_STRENGTH
}
fn default_epsilon() -> f64 {
    EPSILON
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            root_base_strength: default_root_base_strength(),
            epsilon: default_epsilon(),
        }
    }
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

/// Intrinsic strength of `post` before its replies are considered.
///
/// The root gets the fixed midpoint; every other post gets its engagement
/// normalized against the tree-wide bounds plus ε, capped at `1.0`.
/// Without the cap the most engaged post would get `1 + ε`, which pushes its
/// degree just above 1.
pub fn base_strength(
    post: &Post,
    bounds: Option<NormalizationBounds>,
    config: &ScoringConfig,
) -> ScoreResult<f64> {
    if post.argumentative_type.is_root() {
        return Ok(config.root_base_strength);
    }

    let bounds = bounds.ok_or_else(|| ScoreError::MissingBounds {
        id: post.id.to_string(),
    })?;
    let normalized = bounds.normalize(post.engagement()) + config.epsilon;
    Ok(normalized.min(1.0))
}

/// The gradual valuation: degree of an argument with base strength `base`
/// whose children contribute a net `strength_child`.
pub fn acceptability_from(base: f64, strength_child: f64) -> f64 {
    1.0 - ((1.0 - base.powi(2)) / (1.0 + (base * 2f64.powf(strength_child))))
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// One pending node of the post-order walk.
struct Frame {
    id: PostId,
    kind: ArgumentativeType,
    next_child: usize,
    supporters: f64,
    attackers: f64,
}

impl Frame {
    fn open(id: PostId, kind: ArgumentativeType) -> Self {
        Self {
            id,
            kind,
            next_child: 0,
            supporters: 0.0,
            attackers: 0.0,
        }
    }

    /// Fold a finished child's degree into this node's sums.
    fn absorb(&mut self, child_kind: ArgumentativeType, degree: f64) {
        if child_kind == ArgumentativeType::Support {
            self.supporters += degree;
        } else {
            self.attackers += degree;
        }
    }
}

/// Computes acceptability degrees over one tree.
///
/// Degrees are written onto the tree's nodes (overwriting any earlier value)
/// and every scored argument is offered to the metrics' strongest-argument
/// tracker. Scoring the same tree twice yields the same degrees; reset the
/// metrics with [`TreeMetrics::reset_scoring`] between passes if the tracker
/// should start over.
pub struct AcceptabilityScorer<'a> {
    tree: &'a mut ArgumentTree,
    metrics: &'a mut TreeMetrics,
    bounds: Option<NormalizationBounds>,
    config: ScoringConfig,
}

impl<'a> AcceptabilityScorer<'a> {
    /// Scorer using the engagement bounds recorded in `metrics`.
    pub fn new(tree: &'a mut ArgumentTree, metrics: &'a mut TreeMetrics) -> Self {
        let bounds = metrics.bounds();
        Self {
            tree,
            metrics,
            bounds,
            config: ScoringConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScoringConfig) -> Self {
        self.config = config;
        self
    }

    /// Normalize against explicit bounds instead of the recorded ones.
    pub fn with_bounds(mut self, bounds: NormalizationBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Score the whole tree and store the root's degree in the metrics.
    pub fn score_root(&mut self) -> ScoreResult<f64> {
        let root = self.tree.root_id();
        let degree = self.acceptability_degree(root)?;
        self.metrics.set_root_argument_strength(degree);

        tracing::info!(
            root = %root,
            degree,
            strongest = ?self.metrics.strongest_argument_id(),
            "scored argument tree"
        );
        Ok(degree)
    }

    /// Acceptability degree of the subtree rooted at `id`.
    ///
    /// Unknown ids and non-arguments (`neutral`) score `0.0` without touching
    /// the tree or the metrics; a neutral node's replies are not visited.
    pub fn acceptability_degree(&mut self, id: PostId) -> ScoreResult<f64> {
        let Some(kind) = self.argument_kind(id) else {
            return Ok(0.0);
        };

        let mut stack = vec![Frame::open(id, kind)];
        let mut degree = 0.0;
        while let Some(top) = stack.last_mut() {
            if let Some(edge) = self.tree.edge_at(top.id, top.next_child) {
                top.next_child += 1;
                if let Some(child_kind) = self.argument_kind(edge.id) {
                    stack.push(Frame::open(edge.id, child_kind));
                }
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            degree = self.close(&frame)?;
            if let Some(parent) = stack.last_mut() {
                parent.absorb(frame.kind, degree);
            }
        }
        Ok(degree)
    }

    /// Argumentative type of `id` if it takes part in scoring.
    fn argument_kind(&self, id: PostId) -> Option<ArgumentativeType> {
        self.tree
            .get(id)
            .map(|post| post.argumentative_type)
            .filter(|kind| kind.is_argument())
    }

    /// Compute, store and report the degree of a node whose children are done.
    fn close(&mut self, frame: &Frame) -> ScoreResult<f64> {
        let base = match self.tree.get(frame.id) {
            Some(post) => base_strength(post, self.bounds, &self.config)?,
            None => return Ok(0.0),
        };
        let strength_child = frame.supporters - frame.attackers;
        let degree = acceptability_from(base, strength_child);

        self.tree.set_acceptability(frame.id, degree);
        self.metrics.record_candidate_argument(frame.id, degree);

        tracing::trace!(
            post = %frame.id,
            base,
            strength_child,
            degree,
            "scored argument"
        );
        Ok(degree)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
