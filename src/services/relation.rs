//! Argumentative relation classification.
//!
//! A relation classifier receives the parent's text and the reply's text and
//! answers how the reply relates to its parent: support, attack or neutral.
//! It must never answer `none`; that label belongs to the analysis root.

use std::sync::LazyLock;

use regex::Regex;

use crate::post::ArgumentativeType;

use super::error::{ServiceError, ServiceResult};
use super::preprocess::preprocess;

/// Classifies the relation of a reply towards its parent.
pub trait RelationClassifier: Send + Sync {
    fn classify_relation(&self, parent_text: &str, reply_text: &str)
    -> ServiceResult<ArgumentativeType>;

    /// Display name used in logs.
    fn name(&self) -> &str;
}

impl<T: RelationClassifier + ?Sized> RelationClassifier for Box<T> {
    fn classify_relation(
        &self,
        parent_text: &str,
        reply_text: &str,
    ) -> ServiceResult<ArgumentativeType> {
        (**self).classify_relation(parent_text, reply_text)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Reject the root-only label coming out of a classifier.
pub(crate) fn ensure_argument(service: &str, label: ArgumentativeType) -> ServiceResult<ArgumentativeType> {
    if label.is_root() {
        return Err(ServiceError::InvalidOutput {
            service: service.into(),
            message: "relation classifiers cannot label a reply `none`".into(),
        });
    }
    Ok(label)
}

// ── FixedRelation ───────────────────────────────────────────────────────

/// Answers the same label for every pair.
///
/// The default answers `neutral`, the outcome used whenever no real
/// classification is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRelation(pub ArgumentativeType);

impl Default for FixedRelation {
    fn default() -> Self {
        Self(ArgumentativeType::Neutral)
    }
}

impl RelationClassifier for FixedRelation {
    fn classify_relation(&self, _parent: &str, _reply: &str) -> ServiceResult<ArgumentativeType> {
        ensure_argument(self.name(), self.0)
    }

    fn name(&self) -> &str {
        "fixed-relation"
    }
}

// ── CueRelation ─────────────────────────────────────────────────────────

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z][a-z']*").unwrap());

const SUPPORT_CUES: &[&str] = &[
    "agree", "agreed", "exactly", "indeed", "true", "right", "correct", "yes", "absolutely",
    "definitely", "same", "totally",
];

const ATTACK_CUES: &[&str] = &[
    "disagree", "wrong", "false", "nonsense", "incorrect", "nope", "however", "but",
    "doubt", "unlike", "myth",
];

const NEGATORS: &[&str] = &["not", "no", "never", "hardly"];

/// Keyword-cue relation classifier.
///
/// Counts support and attack cue words in the reply; a negator directly in
/// front of a cue flips it. The side with more cues wins, a draw is neutral.
/// The parent text is not consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct CueRelation;

impl CueRelation {
    /// Net cue balance of `reply`: positive leans support, negative attack.
    pub fn balance(reply: &str) -> i32 {
        let text = preprocess(reply).to_lowercase();
        let words: Vec<&str> = RE_WORD.find_iter(&text).map(|m| m.as_str()).collect();
        let mut balance = 0;
        for (i, word) in words.iter().enumerate() {
            let polarity = if SUPPORT_CUES.contains(word) {
                1
            } else if ATTACK_CUES.contains(word) {
                -1
            } else {
                continue;
            };
            let negated = i > 0 && {
                let prev = words[i - 1];
                NEGATORS.contains(&prev) || prev.ends_with("n't")
            };
            balance += if negated { -polarity } else { polarity };
        }
        balance
    }
}

impl RelationClassifier for CueRelation {
    fn classify_relation(&self, _parent: &str, reply: &str) -> ServiceResult<ArgumentativeType> {
        Ok(match Self::balance(reply) {
            b if b > 0 => ArgumentativeType::Support,
            b if b < 0 => ArgumentativeType::Attack,
            _ => ArgumentativeType::Neutral,
        })
    }

    fn name(&self) -> &str {
        "cue-relation"
    }
}
