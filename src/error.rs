//! Errors raised while turning a token stream into a tree or a table

use thiserror::Error;

/// Fatal failures of a single document render.
///
/// Positions are indices into the top-level token stream. None of these are
/// recoverable: the same input always fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The tokenizer broke its own nesting contract
    #[error("malformed token stream at token {position}: {reason}")]
    MalformedTokenStream { position: usize, reason: String },

    /// The stream ended while an element was still open
    #[error("element <{tag}> opened at token {position} is never closed")]
    UnclosedElement { tag: String, position: usize },

    /// A table-open was never matched by a table-close
    #[error("table opened at token {position} is never closed")]
    UnterminatedTable { position: usize },

    /// An inspection dump could not be encoded as JSON
    #[error("cannot encode dump: {reason}")]
    Encode { reason: String },
}

impl RenderError {
    pub(crate) fn malformed(position: usize, reason: impl Into<String>) -> Self {
        RenderError::MalformedTokenStream {
            position,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;
