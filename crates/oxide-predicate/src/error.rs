//! Error types for predicate construction.

use thiserror::Error;

/// Predicate-specific errors.
///
/// All of these surface while routes are being registered. Evaluating a
/// predicate against a request never fails.
#[derive(Debug, Error)]
pub enum PredicateError {
    /// The template did not compile into a valid pattern.
    #[error("invalid uri template `{template}`: {source}")]
    InvalidTemplate {
        template: String,
        #[source]
        source: regex::Error,
    },

    /// A route declaration could not be deserialized.
    #[error("invalid route declaration: {0}")]
    Config(#[from] serde_json::Error),

    /// Unrecognized HTTP method token.
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// Unrecognized HTTP protocol version token.
    #[error("unknown protocol version: {0}")]
    UnknownVersion(String),
}

/// Result type alias for predicate operations.
pub type Result<T> = std::result::Result<T, PredicateError>;
