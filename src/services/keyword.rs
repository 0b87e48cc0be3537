//! Top-keyword extraction, used to search for topically related posts.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use super::error::{ServiceError, ServiceResult};
use super::preprocess::preprocess;

/// Extracts the single most representative keyword of a text.
pub trait KeywordExtractor: Send + Sync {
    fn extract_top_keyword(&self, text: &str) -> ServiceResult<String>;

    /// Display name used in logs.
    fn name(&self) -> &str;
}

impl<T: KeywordExtractor + ?Sized> KeywordExtractor for Box<T> {
    fn extract_top_keyword(&self, text: &str) -> ServiceResult<String> {
        (**self).extract_top_keyword(text)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

static RE_ALPHA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]+").unwrap());

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "both", "but", "by", "can", "could", "did", "do",
    "does", "doing", "don", "for", "from", "had", "has", "have", "having", "he", "her", "here",
    "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "me", "more", "most",
    "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our",
    "out", "over", "own", "same", "she", "should", "so", "some", "such", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your",
    // placeholders left behind by preprocessing
    "http", "user",
];

/// Term-frequency keyword extractor.
///
/// Tokens are lower-cased alphabetic runs of at least `min_len` characters
/// that are not stop words. The most frequent token wins; among equally
/// frequent tokens the one seen first wins.
#[derive(Debug, Clone)]
pub struct FrequencyKeywords {
    stopwords: HashSet<String>,
    min_len: usize,
}

impl Default for FrequencyKeywords {
    fn default() -> Self {
        Self {
            stopwords: STOPWORDS.iter().map(|w| w.to_string()).collect(),
            min_len: 3,
        }
    }
}

impl FrequencyKeywords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords
            .extend(words.into_iter().map(|w| w.into().to_lowercase()));
        self
    }

    /// Candidate keywords in order of first appearance, with their counts.
    pub fn candidates(&self, text: &str) -> Vec<(String, usize)> {
        let normalized = preprocess(text).to_lowercase();
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for m in RE_ALPHA.find_iter(&normalized) {
            let token = m.as_str();
            if token.len() < self.min_len || self.stopwords.contains(token) {
                continue;
            }
            let count = counts.entry(token.to_string()).or_insert(0);
            if *count == 0 {
                order.push(token.to_string());
            }
            *count += 1;
        }
        order
            .into_iter()
            .map(|token| {
                let count = counts.get(&token).copied().unwrap_or(0);
                (token, count)
            })
            .collect()
    }
}

impl KeywordExtractor for FrequencyKeywords {
    fn extract_top_keyword(&self, text: &str) -> ServiceResult<String> {
        let mut best: Option<(String, usize)> = None;
        for (token, count) in self.candidates(text) {
            let replace = match &best {
                Some((_, top)) => count > *top,
                None => true,
            };
            if replace {
                best = Some((token, count));
            }
        }
        best.map(|(token, _)| token)
            .ok_or_else(|| ServiceError::InvalidOutput {
                service: self.name().into(),
                message: "text has no keyword candidates".into(),
            })
    }

    fn name(&self) -> &str {
        "frequency-keywords"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_frequent_token_wins() {
        let kw = FrequencyKeywords::new();
        assert_eq!(
            kw.extract_top_keyword("Pizza is great, pizza with pineapple is the best pizza")
                .unwrap(),
            "pizza"
        );
    }

    #[test]
    fn first_seen_breaks_ties() {
        let kw = FrequencyKeywords::new();
        assert_eq!(
            kw.extract_top_keyword("Python is a superb programming language")
                .unwrap(),
            "python"
        );
    }

    #[test]
    fn skips_stopwords_placeholders_and_short_tokens() {
        let kw = FrequencyKeywords::new();
        let candidates = kw.candidates("@someone look at https://x.co it is ok ok");
        assert_eq!(candidates, vec![("look".to_string(), 1)]);
    }

    #[test]
    fn no_candidates_is_an_error() {
        let kw = FrequencyKeywords::new();
        let err = kw.extract_top_keyword("it is what it is").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOutput { .. }));
    }

    #[test]
    fn custom_stopwords() {
        let kw = FrequencyKeywords::new().with_stopwords(["Python"]);
        assert_eq!(
            kw.extract_top_keyword("Python is a superb programming language")
                .unwrap(),
            "superb"
        );
    }
}
