//! Error types for protocol identifiers

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Identifier rejected during parsing
    #[error("invalid protocol id: {0}")]
    InvalidProtocolId(String),

    /// Version segment missing or malformed
    #[error("invalid version: {0}")]
    InvalidVersion(String),

    /// Matcher mode needs a reference identifier that was not supplied
    #[error("matcher mode {0} requires a reference identifier")]
    MissingReference(&'static str),

    /// Matcher mode needs a predicate, not a reference identifier
    #[error("matcher mode {0} requires a predicate; build it with ProtocolMatcher::custom")]
    MissingPredicate(&'static str),
}
