//! Non-fatal advisories returned next to search results.
//!
//! An advisory flags a configuration that is probably unintended without
//! aborting the call. Every advisory is also logged at `warn` level.

use std::fmt;

use serde::Serialize;
use tracing::warn;

/// A likely-unintended configuration detected during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Requested flex exceeded the query length and was clamped to it.
    FlexTooLarge { requested: usize, query_len: usize },
    /// Active trim rules would strip the query's own first and/or last token.
    TrimmableQuery { start: bool, end: bool },
}

impl Advisory {
    /// Log the advisory through `tracing`.
    pub(crate) fn emit(self) -> Self {
        warn!(advisory = %self, "search advisory");
        self
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlexTooLarge {
                requested,
                query_len,
            } => write!(
                f,
                "flex of size {requested} is greater than len(query) = {query_len}; using {query_len}"
            ),
            Self::TrimmableQuery { start, end } => {
                let edge = match (start, end) {
                    (true, true) => "first and last tokens",
                    (true, false) => "first token",
                    _ => "last token",
                };
                write!(
                    f,
                    "trim rules affect the query's {edge}, which will likely lead to unexpected matches"
                )
            }
        }
    }
}

/// A search result together with the advisories raised while producing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome<T> {
    pub value: T,
    pub advisories: Vec<Advisory>,
}

impl<T> Outcome<T> {
    pub const fn new(value: T, advisories: Vec<Advisory>) -> Self {
        Self { value, advisories }
    }

    /// Discard advisories and keep the value.
    pub fn into_value(self) -> T {
        self.value
    }
}
