//! Error types for pattern registration.

use thiserror::Error;

/// Errors raised while registering scan patterns.
///
/// Scanning itself never fails; these only surface while a pattern set is
/// being assembled.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern is not valid regex syntax.
    #[error("invalid regex pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },

    /// A pattern with the same text is already registered.
    #[error("pattern registered twice: {0:?}")]
    DuplicatePattern(String),
}

/// Result type alias for pattern registration.
pub type Result<T> = std::result::Result<T, PatternError>;
