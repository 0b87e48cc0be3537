//! External collaborators of an analysis run.
//!
//! Each collaborator sits behind a small trait so the pipeline can run against
//! real models, local heuristics or test doubles alike:
//!
//! - [`SentimentClassifier`]: labels a post's sentiment
//! - [`RelationClassifier`]: labels how a reply relates to its parent
//! - [`KeywordExtractor`]: picks the top keyword for related-post search
//! - [`ConversationSource`]: fetches posts, threads and search results
//!
//! [`Fallback`] chains two implementations of the same trait. The reference
//! implementations in this module need no network or model files.

pub mod error;
pub mod fallback;
pub mod keyword;
pub mod preprocess;
pub mod relation;
pub mod sentiment;
pub mod source;

pub use error::{ServiceError, ServiceResult};
pub use fallback::Fallback;
pub use keyword::{FrequencyKeywords, KeywordExtractor};
pub use preprocess::preprocess;
pub use relation::{CueRelation, FixedRelation, RelationClassifier};
pub use sentiment::{LexiconSentiment, SentimentClassifier, label_for_compound};
pub use source::{ConversationSource, RelatedThread, ThreadFile};
