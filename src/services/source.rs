//! Conversation sources: where posts and reply threads come from.
//!
//! [`ThreadFile`] serves a whole analysis from one JSON document, so runs are
//! reproducible and need no network access:
//!
//! ```json
//! {
//!   "root":    { "id": "0", "text": "...", "like_count": 3, "retweet_count": 1 },
//!   "thread":  [ { "id": "1", "referenced_tweets": [{ "id": "0", "text": "..." }], ... } ],
//!   "related": [ { "post": { ... }, "thread": [ ... ] } ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::post::{PostId, PostRecord};

use super::error::{ServiceError, ServiceResult};

/// Supplies posts, their reply threads and keyword search results.
pub trait ConversationSource: Send + Sync {
    /// The post with the given id.
    fn fetch_post(&self, id: PostId) -> ServiceResult<PostRecord>;

    /// Every reply in the conversation started by `id` (not including it).
    fn fetch_conversation(&self, id: PostId) -> ServiceResult<Vec<PostRecord>>;

    /// Up to `limit` posts mentioning `keyword`.
    fn search_related(&self, keyword: &str, limit: usize) -> ServiceResult<Vec<PostRecord>>;
}

/// A related post and the replies under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedThread {
    pub post: PostRecord,
    #[serde(default)]
    pub thread: Vec<PostRecord>,
}

/// File-backed conversation source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadFile {
    pub root: PostRecord,
    #[serde(default)]
    pub thread: Vec<PostRecord>,
    #[serde(default)]
    pub related: Vec<RelatedThread>,
}

impl ThreadFile {
    pub fn new(root: PostRecord, thread: Vec<PostRecord>) -> Self {
        Self {
            root,
            thread,
            related: Vec::new(),
        }
    }

    pub fn with_related(mut self, post: PostRecord, thread: Vec<PostRecord>) -> Self {
        self.related.push(RelatedThread { post, thread });
        self
    }

    /// Read a thread file from disk.
    pub fn load(path: &Path) -> ServiceResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ServiceError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Parse a thread file from JSON text.
    pub fn from_json_str(text: &str) -> ServiceResult<Self> {
        Self::parse(text, "<inline>")
    }

    fn parse(text: &str, origin: &str) -> ServiceResult<Self> {
        let file: Self = serde_json::from_str(text).map_err(|e| ServiceError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(
            path = origin,
            root = %file.root.id,
            replies = file.thread.len(),
            related = file.related.len(),
            "loaded thread file"
        );
        Ok(file)
    }

    /// Id of the post under analysis.
    pub fn root_id(&self) -> PostId {
        self.root.id
    }

    fn find_related(&self, id: PostId) -> Option<&RelatedThread> {
        self.related.iter().find(|r| r.post.id == id)
    }
}

impl ConversationSource for ThreadFile {
    fn fetch_post(&self, id: PostId) -> ServiceResult<PostRecord> {
        if id == self.root.id {
            return Ok(self.root.clone());
        }
        self.find_related(id)
            .map(|r| r.post.clone())
            .ok_or_else(|| ServiceError::Source {
                message: format!("post {id} is not in the thread file"),
            })
    }

    fn fetch_conversation(&self, id: PostId) -> ServiceResult<Vec<PostRecord>> {
        if id == self.root.id {
            return Ok(self.thread.clone());
        }
        self.find_related(id)
            .map(|r| r.thread.clone())
            .ok_or_else(|| ServiceError::Source {
                message: format!("no conversation for post {id} in the thread file"),
            })
    }

    fn search_related(&self, keyword: &str, limit: usize) -> ServiceResult<Vec<PostRecord>> {
        let needle = keyword.to_lowercase();
        Ok(self
            .related
            .iter()
            .filter(|r| r.post.text.to_lowercase().contains(&needle))
            .take(limit)
            .map(|r| r.post.clone())
            .collect())
    }
}
