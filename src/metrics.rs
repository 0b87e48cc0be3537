//! Tree-wide metrics aggregated while a tree is built and scored.
//!
//! One [`TreeMetrics`] belongs to one analysis run. The builder and the scorer
//! receive it by `&mut` and feed it as a side effect; nothing is ever
//! recomputed from the tree, so the aggregator can be queried at any point
//! during construction.
//!
//! Every `record_*` method must be called exactly once per qualifying node per
//! run: calling twice double-counts.

use serde::{Deserialize, Serialize};

use crate::post::{Post, PostId, Sentiment};

/// Tie-break priority used by [`majority_label`], highest first.
pub const TIE_BREAK_ORDER: [Sentiment; 3] =
    [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

// ---------------------------------------------------------------------------
// SentimentCounts
// ---------------------------------------------------------------------------

/// Histogram of sentiment labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

impl SentimentCounts {
    pub fn increment(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    pub fn get(&self, sentiment: Sentiment) -> u32 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    pub fn total(&self) -> u32 {
        self.positive + self.neutral + self.negative
    }

    /// Add another histogram's counts to this one.
    pub fn merge(&mut self, other: &SentimentCounts) {
        self.positive += other.positive;
        self.neutral += other.neutral;
        self.negative += other.negative;
    }
}

/// The most frequent label in `counts`.
///
/// Ties go to the label listed first in [`TIE_BREAK_ORDER`]
/// (positive, then neutral, then negative); an empty histogram is a
/// three-way tie and yields `positive`.
pub fn majority_label(counts: &SentimentCounts) -> Sentiment {
    let mut best = TIE_BREAK_ORDER[0];
    for &label in &TIE_BREAK_ORDER[1..] {
        if counts.get(label) > counts.get(best) {
            best = label;
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Bounds & strongest argument
// ---------------------------------------------------------------------------

/// Running engagement bounds used to normalize base strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationBounds {
    pub min: u64,
    pub max: u64,
}

impl NormalizationBounds {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Bounds seeded by a single observation.
    pub fn from_sample(engagement: u64) -> Self {
        Self {
            min: engagement,
            max: engagement,
        }
    }

    pub fn observe(&mut self, engagement: u64) {
        self.min = self.min.min(engagement);
        self.max = self.max.max(engagement);
    }

    /// Position of `engagement` within the bounds, clamped to `[0, 1]`.
    ///
    /// Degenerate bounds (`max == min`) normalize everything to `0`.
    pub fn normalize(&self, engagement: u64) -> f64 {
        if self.max <= self.min {
            return 0.0;
        }
        let span = (self.max - self.min) as f64;
        let offset = engagement as f64 - self.min as f64;
        (offset / span).clamp(0.0, 1.0)
    }
}

/// The highest-scoring argument seen during a scoring pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrongestArgument {
    pub id: PostId,
    pub score: f64,
}

// ---------------------------------------------------------------------------
// TreeMetrics
// ---------------------------------------------------------------------------

/// Mutable accumulator for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct TreeMetrics {
    bounds: Option<NormalizationBounds>,
    root_sentiment: Option<Sentiment>,
    towards_root: SentimentCounts,
    general: SentimentCounts,
    strongest: Option<StrongestArgument>,
    root_argument_strength: Option<f64>,
}

impl TreeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a node's engagement into the normalization bounds.
    ///
    /// The first call establishes both bounds from that sample.
    pub fn record_engagement(&mut self, post: &Post) {
        let engagement = post.engagement();
        match self.bounds.as_mut() {
            Some(bounds) => bounds.observe(engagement),
            None => self.bounds = Some(NormalizationBounds::from_sample(engagement)),
        }
    }

    /// Count a node's sentiment in the direct-reply or general histogram.
    pub fn record_sentiment(&mut self, sentiment: Sentiment, is_direct_reply_to_root: bool) {
        if is_direct_reply_to_root {
            self.towards_root.increment(sentiment);
        } else {
            self.general.increment(sentiment);
        }
    }

    /// Offer a scored node as strongest argument.
    ///
    /// Only a strictly greater score replaces the current holder, so the first
    /// node reaching a given score keeps it.
    pub fn record_candidate_argument(&mut self, id: PostId, score: f64) {
        let replace = match self.strongest {
            Some(current) => score > current.score,
            None => true,
        };
        if replace {
            self.strongest = Some(StrongestArgument { id, score });
        }
    }

    /// Fold the construction-time samples of `other` into this aggregator.
    ///
    /// Engagement bounds widen to cover both, sentiment histograms add up.
    /// Scoring state (strongest argument, root strength) is not touched.
    pub fn absorb(&mut self, other: &TreeMetrics) {
        if let Some(theirs) = other.bounds {
            match self.bounds.as_mut() {
                Some(bounds) => {
                    bounds.observe(theirs.min);
                    bounds.observe(theirs.max);
                }
                None => self.bounds = Some(theirs),
            }
        }
        self.towards_root.merge(&other.towards_root);
        self.general.merge(&other.general);
    }

    pub fn set_root_sentiment(&mut self, sentiment: Sentiment) {
        self.root_sentiment = Some(sentiment);
    }

    pub fn set_root_argument_strength(&mut self, strength: f64) {
        self.root_argument_strength = Some(strength);
    }

    /// Clear everything a scoring pass writes, keeping construction-time data.
    pub fn reset_scoring(&mut self) {
        self.strongest = None;
        self.root_argument_strength = None;
    }

    pub fn bounds(&self) -> Option<NormalizationBounds> {
        self.bounds
    }

    pub fn max_score(&self) -> Option<u64> {
        self.bounds.map(|b| b.max)
    }

    pub fn min_score(&self) -> Option<u64> {
        self.bounds.map(|b| b.min)
    }

    pub fn root_sentiment(&self) -> Option<Sentiment> {
        self.root_sentiment
    }

    pub fn towards_root_counts(&self) -> &SentimentCounts {
        &self.towards_root
    }

    pub fn general_counts(&self) -> &SentimentCounts {
        &self.general
    }

    /// Majority sentiment of the direct replies to the root.
    pub fn sentiment_towards_root(&self) -> Sentiment {
        majority_label(&self.towards_root)
    }

    /// Majority sentiment of every other admitted post.
    pub fn general_sentiment(&self) -> Sentiment {
        majority_label(&self.general)
    }

    pub fn strongest_argument(&self) -> Option<StrongestArgument> {
        self.strongest
    }

    pub fn strongest_argument_id(&self) -> Option<PostId> {
        self.strongest.map(|s| s.id)
    }

    pub fn strongest_argument_score(&self) -> Option<f64> {
        self.strongest.map(|s| s.score)
    }

    pub fn root_argument_strength(&self) -> Option<f64> {
        self.root_argument_strength
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::{ArgumentativeType, PublicMetrics};

    fn post(likes: u64, retweets: u64) -> Post {
        Post::new(
            1u64,
            "",
            PublicMetrics::new(likes, retweets),
            Sentiment::Neutral,
            ArgumentativeType::Support,
        )
    }

    #[test]
    fn bounds_track_true_extremes() {
        let mut metrics = TreeMetrics::new();
        metrics.record_engagement(&post(100, 50));
        metrics.record_engagement(&post(2, 1));

        assert_eq!(metrics.max_score(), Some(150));
        assert_eq!(metrics.min_score(), Some(3));
    }

    #[test]
    fn first_sample_seeds_min_instead_of_zero() {
        let mut metrics = TreeMetrics::new();
        assert!(metrics.bounds().is_none());

        metrics.record_engagement(&post(500, 0));
        metrics.record_engagement(&post(800, 20));

        assert_eq!(metrics.min_score(), Some(500));
        assert_eq!(metrics.max_score(), Some(820));
    }

    #[test]
    fn normalize_handles_degenerate_and_out_of_range() {
        let flat = NormalizationBounds::from_sample(7);
        assert_eq!(flat.normalize(7), 0.0);

        let bounds = NormalizationBounds::new(10, 20);
        assert_eq!(bounds.normalize(15), 0.5);
        assert_eq!(bounds.normalize(0), 0.0);
        assert_eq!(bounds.normalize(40), 1.0);
    }

    #[test]
    fn general_sentiment_majority() {
        let mut metrics = TreeMetrics::new();
        metrics.record_sentiment(Sentiment::Positive, false);
        metrics.record_sentiment(Sentiment::Positive, false);
        metrics.record_sentiment(Sentiment::Negative, false);
        metrics.record_sentiment(Sentiment::Neutral, false);

        assert_eq!(metrics.general_sentiment(), Sentiment::Positive);
        assert_eq!(metrics.general_counts().total(), 4);
        assert_eq!(metrics.towards_root_counts().total(), 0);
    }

    #[test]
    fn sentiment_towards_root_uses_direct_replies_only() {
        let mut metrics = TreeMetrics::new();
        metrics.record_sentiment(Sentiment::Negative, true);
        metrics.record_sentiment(Sentiment::Negative, true);
        metrics.record_sentiment(Sentiment::Positive, false);
        metrics.record_sentiment(Sentiment::Positive, false);
        metrics.record_sentiment(Sentiment::Positive, false);

        assert_eq!(metrics.sentiment_towards_root(), Sentiment::Negative);
        assert_eq!(metrics.general_sentiment(), Sentiment::Positive);
    }

    #[test]
    fn majority_label_tie_break_order() {
        let counts = |positive, neutral, negative| SentimentCounts {
            positive,
            neutral,
            negative,
        };

        assert_eq!(majority_label(&counts(2, 1, 1)), Sentiment::Positive);
        assert_eq!(majority_label(&counts(0, 0, 0)), Sentiment::Positive);
        assert_eq!(majority_label(&counts(3, 3, 3)), Sentiment::Positive);
        assert_eq!(majority_label(&counts(1, 2, 2)), Sentiment::Neutral);
        assert_eq!(majority_label(&counts(2, 0, 2)), Sentiment::Positive);
        assert_eq!(majority_label(&counts(0, 1, 1)), Sentiment::Neutral);
        assert_eq!(majority_label(&counts(0, 1, 4)), Sentiment::Negative);
    }

    #[test]
    fn strongest_argument_uses_strict_greater_than() {
        let mut metrics = TreeMetrics::new();
        metrics.record_candidate_argument(PostId(0), 1.0);
        metrics.record_candidate_argument(PostId(1), 10.0);
        metrics.record_candidate_argument(PostId(2), 5.0);
        metrics.record_candidate_argument(PostId(3), 10.0);

        assert_eq!(metrics.strongest_argument_id(), Some(PostId(1)));
        assert_eq!(metrics.strongest_argument_score(), Some(10.0));
    }

    #[test]
    fn absorb_widens_bounds_and_adds_counts() {
        let mut metrics = TreeMetrics::new();
        metrics.record_engagement(&post(5, 0));
        metrics.record_sentiment(Sentiment::Positive, true);
        metrics.record_candidate_argument(PostId(1), 0.4);

        let mut staged = TreeMetrics::new();
        staged.record_engagement(&post(1, 1));
        staged.record_engagement(&post(90, 10));
        staged.record_sentiment(Sentiment::Negative, false);
        staged.record_candidate_argument(PostId(7), 0.9);

        metrics.absorb(&staged);

        assert_eq!(metrics.min_score(), Some(2));
        assert_eq!(metrics.max_score(), Some(100));
        assert_eq!(metrics.towards_root_counts().positive, 1);
        assert_eq!(metrics.general_counts().negative, 1);
        assert_eq!(metrics.strongest_argument_id(), Some(PostId(1)));

        let mut empty = TreeMetrics::new();
        empty.absorb(&staged);
        assert_eq!(empty.bounds(), staged.bounds());
    }

    #[test]
    fn reset_scoring_keeps_construction_data() {
        let mut metrics = TreeMetrics::new();
        metrics.record_engagement(&post(3, 4));
        metrics.record_sentiment(Sentiment::Negative, true);
        metrics.set_root_sentiment(Sentiment::Positive);
        metrics.record_candidate_argument(PostId(9), 0.8);
        metrics.set_root_argument_strength(0.6);

        metrics.reset_scoring();

        assert!(metrics.strongest_argument().is_none());
        assert!(metrics.root_argument_strength().is_none());
        assert_eq!(metrics.max_score(), Some(7));
        assert_eq!(metrics.root_sentiment(), Some(Sentiment::Positive));
        assert_eq!(metrics.sentiment_towards_root(), Sentiment::Negative);
    }
}
