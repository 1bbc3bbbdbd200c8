//! Error types for the fuzzy-span crate.

use crate::regex_search::pattern::PatternError;

/// Errors raised at the call boundary, before any scan work begins.
///
/// "No match" is never an error: searches return `None` or an empty list.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// The document could not be built or is not searchable.
    #[error("invalid document: {reason}")]
    InvalidDocument { reason: String },

    /// The query could not be built or is not searchable (e.g. empty).
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// No similarity function registered under this name.
    #[error("unknown fuzzy matching algorithm: {name}")]
    UnknownAlgorithm { name: String },

    /// No trim rule known under this name.
    #[error("unknown trim rule: {name}")]
    UnknownTrimRule { name: String },

    /// No predefined regex pattern registered under this name.
    #[error("{name} is not a regex pattern defined in this config")]
    UnknownPredefinedPattern { name: String },

    /// Flex must be `"default"` or a non-negative integer.
    #[error("flex must be either \"default\" or a non-negative integer, not {value:?}")]
    InvalidFlex { value: String },

    /// A literal pattern failed to compile under both regex engines.
    #[error("failed to compile regex {pattern:?}: {source}")]
    RegexCompile {
        pattern: String,
        #[source]
        source: PatternError,
    },

    /// The backtracking engine gave up while searching.
    #[error("regex {pattern:?} failed during search: {reason}")]
    RegexRuntime { pattern: String, reason: String },

    /// JSON deserialization error for search options.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type for fuzzy-span operations.
pub type MatchResult<T> = Result<T, MatchError>;
