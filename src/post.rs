//! Post records: the attributes attached to every node of an argument tree.
//!
//! Two shapes live here:
//!
//! - [`PostRecord`]: a post as delivered by a conversation source, with the
//!   labels (sentiment, argumentative relation) still optional.
//! - [`Post`]: a fully labeled node attribute set, immutable after admission
//!   into a tree except for the single `acceptability` write by the scorer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// PostId
// ---------------------------------------------------------------------------

/// Platform identifier of a post.
///
/// Ids are snowflake-style integers that grow with creation time, so their
/// numeric order is the order in which posts were written. On the wire they
/// travel as strings; both JSON strings and numbers are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostId(pub u64);

impl PostId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(PostId)
    }
}

impl From<u64> for PostId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl Serialize for PostId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Ok(PostId(n)),
            RawId::Text(s) => s.parse().map_err(|e| {
                serde::de::Error::custom(format!("invalid post id \"{s}\": {e}"))
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Sentiment label of a post, supplied by a sentiment classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Negative => write!(f, "negative"),
        }
    }
}

/// Argumentative relation of a post towards the post it replies to.
///
/// `None` is reserved for the post under analysis: exactly one node of a
/// tree carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentativeType {
    /// The root of the analysis.
    None,
    /// Argues in favour of its parent.
    Support,
    /// Argues against its parent.
    Attack,
    /// Not an argument (chit-chat, questions, fallback classification).
    Neutral,
}

impl ArgumentativeType {
    /// Whether this label marks the analysis root.
    pub fn is_root(self) -> bool {
        self == ArgumentativeType::None
    }

    /// Whether a node with this label takes part in scoring.
    pub fn is_argument(self) -> bool {
        self != ArgumentativeType::Neutral
    }
}

impl fmt::Display for ArgumentativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentativeType::None => write!(f, "none"),
            ArgumentativeType::Support => write!(f, "support"),
            ArgumentativeType::Attack => write!(f, "attack"),
            ArgumentativeType::Neutral => write!(f, "neutral"),
        }
    }
}

// ---------------------------------------------------------------------------
// PublicMetrics
// ---------------------------------------------------------------------------

/// Public engagement counters of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicMetrics {
    pub like_count: u64,
    pub retweet_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_count: Option<u64>,
}

impl PublicMetrics {
    pub fn new(like_count: u64, retweet_count: u64) -> Self {
        Self {
            like_count,
            retweet_count,
            ..Default::default()
        }
    }

    /// Engagement score: likes plus reposts.
    pub fn engagement(&self) -> u64 {
        self.like_count.saturating_add(self.retweet_count)
    }
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// Node attributes of one post inside an argument tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    #[serde(flatten)]
    pub public_metrics: PublicMetrics,
    pub sentiment: Sentiment,
    pub argumentative_type: ArgumentativeType,
    /// Acceptability degree in `[0, 1]`, written by the scorer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptability: Option<f64>,
}

impl Post {
    pub fn new(
        id: impl Into<PostId>,
        text: impl Into<String>,
        public_metrics: PublicMetrics,
        sentiment: Sentiment,
        argumentative_type: ArgumentativeType,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            public_metrics,
            sentiment,
            argumentative_type,
            acceptability: None,
        }
    }

    pub fn engagement(&self) -> u64 {
        self.public_metrics.engagement()
    }
}

// ---------------------------------------------------------------------------
// PostRecord
// ---------------------------------------------------------------------------

/// A post referenced by another one (the post being replied to).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencedPost {
    pub id: PostId,
    #[serde(default)]
    pub text: String,
}

/// A post as delivered by a conversation source, before labeling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: PostId,
    pub text: String,
    #[serde(flatten)]
    pub public_metrics: PublicMetrics,
    /// Posts this one replies to or quotes; the first entry is the parent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referenced_tweets: Vec<ReferencedPost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argumentative_type: Option<ArgumentativeType>,
}

impl PostRecord {
    pub fn new(id: impl Into<PostId>, text: impl Into<String>, public_metrics: PublicMetrics) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            public_metrics,
            referenced_tweets: Vec::new(),
            sentiment: None,
            argumentative_type: None,
        }
    }

    pub fn replying_to(mut self, parent: impl Into<PostId>, parent_text: impl Into<String>) -> Self {
        self.referenced_tweets.insert(
            0,
            ReferencedPost {
                id: parent.into(),
                text: parent_text.into(),
            },
        );
        self
    }

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    pub fn with_type(mut self, argumentative_type: ArgumentativeType) -> Self {
        self.argumentative_type = Some(argumentative_type);
        self
    }

    /// Id of the post this one directly replies to.
    pub fn parent_id(&self) -> Option<PostId> {
        self.referenced_tweets.first().map(|r| r.id)
    }

    /// Text of the post this one directly replies to, as carried by the record.
    pub fn parent_text(&self) -> Option<&str> {
        self.referenced_tweets.first().map(|r| r.text.as_str())
    }

    /// A post that neither replies to nor quotes anything.
    pub fn is_fresh(&self) -> bool {
        self.referenced_tweets.is_empty()
    }

    /// Convert into node attributes once both labels are known.
    ///
    /// Returns `None` when either label is still missing.
    pub fn into_post(self) -> Option<Post> {
        let sentiment = self.sentiment?;
        let argumentative_type = self.argumentative_type?;
        Some(Post::new(
            self.id,
            self.text,
            self.public_metrics,
            sentiment,
            argumentative_type,
        ))
    }
}
