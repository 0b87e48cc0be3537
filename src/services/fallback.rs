//! Primary-then-secondary composition of collaborators.

use crate::post::{ArgumentativeType, Sentiment};

use super::error::ServiceResult;
use super::keyword::KeywordExtractor;
use super::relation::RelationClassifier;
use super::sentiment::SentimentClassifier;

/// Tries `primary` first and answers with `secondary` when it fails.
///
/// Implements every collaborator trait both sides implement, so a heavy
/// model can be paired with a cheap local classifier. The secondary's error
/// is returned when both fail.
#[derive(Debug, Clone)]
pub struct Fallback<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> Fallback<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn secondary(&self) -> &S {
        &self.secondary
    }
}

impl<P: SentimentClassifier, S: SentimentClassifier> SentimentClassifier for Fallback<P, S> {
    fn classify_sentiment(&self, text: &str) -> ServiceResult<Sentiment> {
        self.primary.classify_sentiment(text).or_else(|err| {
            tracing::warn!(
                primary = self.primary.name(),
                secondary = self.secondary.name(),
                error = %err,
                "sentiment classifier failed, falling back"
            );
            self.secondary.classify_sentiment(text)
        })
    }

    fn name(&self) -> &str {
        self.primary.name()
    }
}

impl<P: RelationClassifier, S: RelationClassifier> RelationClassifier for Fallback<P, S> {
    fn classify_relation(
        &self,
        parent_text: &str,
        reply_text: &str,
    ) -> ServiceResult<ArgumentativeType> {
        self.primary
            .classify_relation(parent_text, reply_text)
            .or_else(|err| {
                tracing::warn!(
                    primary = self.primary.name(),
                    secondary = self.secondary.name(),
                    error = %err,
                    "relation classifier failed, falling back"
                );
                self.secondary.classify_relation(parent_text, reply_text)
            })
    }

    fn name(&self) -> &str {
        self.primary.name()
    }
}

impl<P: KeywordExtractor, S: KeywordExtractor> KeywordExtractor for Fallback<P, S> {
    fn extract_top_keyword(&self, text: &str) -> ServiceResult<String> {
        self.primary.extract_top_keyword(text).or_else(|err| {
            tracing::warn!(
                primary = self.primary.name(),
                secondary = self.secondary.name(),
                error = %err,
                "keyword extractor failed, falling back"
            );
            self.secondary.extract_top_keyword(text)
        })
    }

    fn name(&self) -> &str {
        self.primary.name()
    }
}
