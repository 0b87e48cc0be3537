//! Sentiment classification.
//!
//! [`LexiconSentiment`] is a self-contained valence-lexicon scorer: each
//! sentence gets a compound polarity in `[-1, 1]`, the post's compound is the
//! mean over its sentences, and the label follows the usual ±0.05 thresholds.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::post::Sentiment;

use super::error::{ServiceError, ServiceResult};
use super::preprocess::preprocess;

/// Compound score at or above which a text is positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound score at or below which a text is negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Normalization constant of the compound score.
const ALPHA: f64 = 15.0;
/// Valence multiplier applied to a negated word.
const NEGATION_SCALAR: f64 = -0.74;
/// How many preceding tokens a negator reaches.
const NEGATION_WINDOW: usize = 3;

// ── SentimentClassifier trait ───────────────────────────────────────────

/// Labels the sentiment of a single post text.
pub trait SentimentClassifier: Send + Sync {
    fn classify_sentiment(&self, text: &str) -> ServiceResult<Sentiment>;

    /// Display name used in logs.
    fn name(&self) -> &str;
}

impl<T: SentimentClassifier + ?Sized> SentimentClassifier for Box<T> {
    fn classify_sentiment(&self, text: &str) -> ServiceResult<Sentiment> {
        (**self).classify_sentiment(text)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Map a compound polarity score to a label.
pub fn label_for_compound(compound: f64) -> Sentiment {
    if compound >= POSITIVE_THRESHOLD {
        Sentiment::Positive
    } else if compound <= NEGATIVE_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

// ── Lexicon ─────────────────────────────────────────────────────────────

static RE_SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

static RE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z][a-z']*").unwrap());

const DEFAULT_LEXICON: &[(&str, f64)] = &[
    ("agree", 1.5),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("brilliant", 2.8),
    ("correct", 1.6),
    ("excellent", 2.7),
    ("fantastic", 2.6),
    ("fun", 2.3),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("like", 1.5),
    ("love", 3.2),
    ("nice", 1.8),
    ("perfect", 2.7),
    ("right", 1.2),
    ("superb", 3.1),
    ("thanks", 1.9),
    ("true", 1.4),
    ("useful", 1.9),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("angry", -2.3),
    ("awful", -2.0),
    ("bad", -2.5),
    ("boring", -1.3),
    ("disagree", -1.6),
    ("disgusting", -2.4),
    ("dislike", -1.6),
    ("fail", -2.5),
    ("false", -1.4),
    ("hate", -2.7),
    ("horrible", -2.5),
    ("lie", -1.6),
    ("poor", -2.1),
    ("sad", -2.1),
    ("stupid", -2.4),
    ("terrible", -2.1),
    ("ugly", -2.3),
    ("useless", -1.8),
    ("worst", -3.1),
    ("wrong", -2.1),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "cannot", "without",
];

fn is_negator(token: &str) -> bool {
    NEGATORS.contains(&token) || token.ends_with("n't")
}

/// Squash a raw valence sum into `(-1, 1)`.
fn normalize_sum(sum: f64) -> f64 {
    if sum == 0.0 {
        return 0.0;
    }
    sum / (sum * sum + ALPHA).sqrt()
}

// ── LexiconSentiment ────────────────────────────────────────────────────

/// Lexicon-based sentiment classifier with negation handling.
#[derive(Debug, Clone)]
pub struct LexiconSentiment {
    valences: HashMap<String, f64>,
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        Self {
            valences: DEFAULT_LEXICON
                .iter()
                .map(|&(word, valence)| (word.to_string(), valence))
                .collect(),
        }
    }
}

impl LexiconSentiment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or override lexicon entries. Words are matched lower-cased.
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        for (word, valence) in words {
            self.valences.insert(word.into().to_lowercase(), valence);
        }
        self
    }

    /// Compound polarity of a single sentence.
    fn sentence_compound(&self, sentence: &str) -> f64 {
        let tokens: Vec<&str> = RE_TOKEN.find_iter(sentence).map(|m| m.as_str()).collect();
        let mut sum = 0.0;
        for (i, token) in tokens.iter().enumerate() {
            let Some(&valence) = self.valences.get(*token) else {
                continue;
            };
            let window = &tokens[i.saturating_sub(NEGATION_WINDOW)..i];
            let negated = window.iter().any(|t| is_negator(t));
            sum += if negated { valence * NEGATION_SCALAR } else { valence };
        }
        normalize_sum(sum)
    }

    /// Mean compound polarity over the sentences of `text`.
    pub fn compound(&self, text: &str) -> f64 {
        let normalized = preprocess(text).to_lowercase();
        let sentences: Vec<&str> = RE_SENTENCE_END
            .split(&normalized)
            .filter(|s| !s.trim().is_empty())
            .collect();
        if sentences.is_empty() {
            return 0.0;
        }
        let total: f64 = sentences.iter().map(|s| self.sentence_compound(s)).sum();
        total / sentences.len() as f64
    }
}

impl SentimentClassifier for LexiconSentiment {
    fn classify_sentiment(&self, text: &str) -> ServiceResult<Sentiment> {
        let compound = self.compound(text);
        if !compound.is_finite() {
            return Err(ServiceError::InvalidOutput {
                service: self.name().into(),
                message: format!("non-finite compound score {compound}"),
            });
        }
        Ok(label_for_compound(compound))
    }

    fn name(&self) -> &str {
        "lexicon-sentiment"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_thresholds() {
        assert_eq!(label_for_compound(0.05), Sentiment::Positive);
        assert_eq!(label_for_compound(0.049), Sentiment::Neutral);
        assert_eq!(label_for_compound(-0.049), Sentiment::Neutral);
        assert_eq!(label_for_compound(-0.05), Sentiment::Negative);
    }

    #[test]
    fn classifies_simple_polarity() {
        let clf = LexiconSentiment::new();
        assert_eq!(clf.classify_sentiment("I love Pizza").unwrap(), Sentiment::Positive);
        assert_eq!(
            clf.classify_sentiment("This is a terrible idea").unwrap(),
            Sentiment::Negative
        );
        assert_eq!(clf.classify_sentiment("The sky is blue").unwrap(), Sentiment::Neutral);
        assert_eq!(clf.classify_sentiment("").unwrap(), Sentiment::Neutral);
    }

    #[test]
    fn negation_flips_polarity() {
        let clf = LexiconSentiment::new();
        assert_eq!(clf.classify_sentiment("this is not good").unwrap(), Sentiment::Negative);
        assert_eq!(clf.classify_sentiment("it isn't bad at all").unwrap(), Sentiment::Positive);
    }

    #[test]
    fn compound_is_mean_over_sentences() {
        let clf = LexiconSentiment::new();
        let one = clf.compound("I love it");
        let two = clf.compound("I love it. The sky is blue.");
        assert!(one > 0.0);
        assert!((two - one / 2.0).abs() < 1e-12);
        assert!(clf.compound("love love love love love love") < 1.0);
    }

    #[test]
    fn handles_and_links_do_not_score() {
        assert_eq!(LexiconSentiment::new().compound("@love https://great.example"), 0.0);

        // The handle is rewritten to the `@user` placeholder before scoring.
        let clf = LexiconSentiment::new().with_words([("USER", 3.0)]);
        assert!(clf.compound("@love https://great.example") > 0.0);
    }

    #[test]
    fn boxed_classifier_delegates() {
        let boxed: Box<dyn SentimentClassifier> = Box::new(LexiconSentiment::new());
        assert_eq!(boxed.name(), "lexicon-sentiment");
        assert_eq!(boxed.classify_sentiment("great").unwrap(), Sentiment::Positive);
    }
}
