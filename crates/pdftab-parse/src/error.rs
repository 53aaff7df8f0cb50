//! Error types for the lexing and interpretation layer.
//!
//! Uses [`thiserror`] for ergonomic error derivation. [`StreamError`]
//! converts into the unified [`ExtractError`] for callers above this layer.

use pdftab_core::ExtractError;
use thiserror::Error;

/// Error raised while lexing or interpreting a content stream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// The stream ended inside a literal string, hex string, array, or
    /// dictionary. Tokens produced before the error remain valid.
    #[error("malformed content stream: {0}")]
    MalformedStream(String),

    /// A caller-supplied cap on token count or nesting depth was exceeded.
    #[error("limit exceeded: {limit_name} (limit: {limit_value}, actual: {actual_value})")]
    LimitExceeded {
        /// Name of the limit that was exceeded.
        limit_name: String,
        /// The configured limit value.
        limit_value: usize,
        /// The actual value that exceeded the limit.
        actual_value: usize,
    },
}

impl From<StreamError> for ExtractError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::MalformedStream(msg) => ExtractError::MalformedStream(msg),
            StreamError::LimitExceeded {
                limit_name,
                limit_value,
                actual_value,
            } => ExtractError::LimitExceeded {
                limit_name,
                limit_value,
                actual_value,
            },
        }
    }
}
