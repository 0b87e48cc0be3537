//! Collaborator error types with rich miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by external collaborators (classifiers, extractors, sources).
///
/// The core never sees these: a failing classifier is covered by a
/// [`Fallback`](super::Fallback) or by the analyzer's per-post defaults.
#[derive(Debug, Error, Diagnostic)]
pub enum ServiceError {
    #[error("{service} is unavailable: {message}")]
    #[diagnostic(
        code(agora::services::unavailable),
        help(
            "The collaborator could not be reached or has not been initialised. \
             Wrap it in a Fallback to keep the analysis running without it."
        )
    )]
    Unavailable { service: String, message: String },

    #[error("{service} returned an unusable result: {message}")]
    #[diagnostic(
        code(agora::services::invalid_output),
        help(
            "Classifiers must answer with one of the known labels. A relation \
             classifier may return support, attack or neutral, never none."
        )
    )]
    InvalidOutput { service: String, message: String },

    #[error("conversation source failed: {message}")]
    #[diagnostic(
        code(agora::services::source),
        help("Check that the requested post exists in the conversation source.")
    )]
    Source { message: String },

    #[error("failed to read thread file: {path}")]
    #[diagnostic(
        code(agora::services::io),
        help("Ensure the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse thread file: {path}")]
    #[diagnostic(
        code(agora::services::parse),
        help(
            "A thread file is a JSON object with a `root` post, a `thread` array of \
             replies and an optional `related` array of {{post, thread}} objects."
        )
    )]
    Parse { path: String, message: String },
}

/// Result alias for collaborator calls.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ServiceError::Unavailable {
            service: "bertweet".into(),
            message: "model not loaded".into(),
        };
        assert_eq!(err.to_string(), "bertweet is unavailable: model not loaded");

        let err = ServiceError::Source {
            message: "post 7 not found".into(),
        };
        assert!(err.to_string().contains("post 7 not found"));
    }

    #[test]
    fn io_error_keeps_source() {
        use std::error::Error as _;

        let err = ServiceError::Io {
            path: "/nope.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/nope.json"));
        assert!(err.source().is_some());
    }
}
