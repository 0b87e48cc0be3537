//! Rich diagnostic error types for the agora analysis pipeline.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so callers know exactly which input
//! broke the analysis and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::post::ArgumentativeType;
use crate::services::ServiceError;

/// Top-level error type for an analysis run.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum AgoraError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Score(#[from] ScoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Tree errors
// ---------------------------------------------------------------------------

/// Structural errors raised while building or composing an argument tree.
///
/// Malformed replies never produce one of these: they are dropped silently.
/// Only a broken root (or an impossible graft) aborts construction.
#[derive(Debug, Error, Diagnostic)]
pub enum TreeError {
    #[error("root post is missing required field `{field}`")]
    #[diagnostic(
        code(agora::tree::missing_root_field),
        help(
            "The post under analysis must carry every node attribute before the tree \
             is built. Label the root's sentiment before handing it to the builder."
        )
    )]
    MissingRootField { field: &'static str },

    #[error("root post {id} is declared as `{found}`, expected `none`")]
    #[diagnostic(
        code(agora::tree::root_not_none),
        help(
            "Only the post under analysis may carry the `none` argumentative type, and it \
             must carry it. Drop the relation label from the root record."
        )
    )]
    RootNotNone { id: String, found: ArgumentativeType },

    #[error("subtree root {id} cannot be grafted with argumentative type `none`")]
    #[diagnostic(
        code(agora::tree::subtree_root_none),
        help(
            "A grafted subtree is an argument about the main root, so its root must be \
             labeled support, attack or neutral. Classify it against the main root first."
        )
    )]
    SubtreeRootNone { id: String },

    #[error("graft would duplicate post {id}")]
    #[diagnostic(
        code(agora::tree::graft_overlap),
        help(
            "The grafted tree shares a post with the primary tree. Related posts must be \
             conversationally unconnected to the analysed thread."
        )
    )]
    GraftOverlap { id: String },
}

/// Convenience alias for tree construction results.
pub type TreeResult<T> = std::result::Result<T, TreeError>;

// ---------------------------------------------------------------------------
// Scoring errors
// ---------------------------------------------------------------------------

/// Data-contract violations detected by the acceptability scorer.
#[derive(Debug, Error, Diagnostic)]
pub enum ScoreError {
    #[error("cannot normalize engagement of post {id}: no engagement bounds recorded")]
    #[diagnostic(
        code(agora::score::missing_bounds),
        help(
            "Every non-root post must be admitted through the tree builder, which records \
             its engagement in the metrics aggregator. Build the tree with the same \
             aggregator that is handed to the scorer, or supply explicit bounds."
        )
    )]
    MissingBounds { id: String },
}

/// Convenience alias for scoring results.
pub type ScoreResult<T> = std::result::Result<T, ScoreError>;

/// Convenience alias for functions returning agora results.
pub type AgoraResult<T> = std::result::Result<T, AgoraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_error_converts_to_agora_error() {
        let err = TreeError::MissingRootField { field: "sentiment" };
        let agora: AgoraError = err.into();
        assert!(matches!(
            agora,
            AgoraError::Tree(TreeError::MissingRootField { field: "sentiment" })
        ));
    }

    #[test]
    fn score_error_converts_to_agora_error() {
        let err = ScoreError::MissingBounds { id: "7".into() };
        let agora: AgoraError = err.into();
        assert!(matches!(agora, AgoraError::Score(ScoreError::MissingBounds { .. })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = TreeError::RootNotNone {
            id: "42".into(),
            found: ArgumentativeType::Attack,
        };
        let msg = format!("{err}");
        assert!(msg.contains("42"));
        assert!(msg.contains("attack"));
    }
}
