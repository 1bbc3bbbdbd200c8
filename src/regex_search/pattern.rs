//! Compiled patterns and the regex-engine boundary.
//!
//! A pattern compiles to one of three engines:
//!
//! - `regex`, linear time, tried first;
//! - `fancy_regex`, backtracking, for look-around and backreferences;
//! - the built-in approximate literal engine for `(?:literal){e<=N}`.
//!
//! All of them report byte offsets into the searched text.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::approx::ApproxLiteral;
use crate::error::{MatchError, MatchResult};

/// Why a pattern could not be compiled.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    /// Rejected by the backtracking engine, the last one tried.
    #[error(transparent)]
    Fancy(Box<fancy_regex::Error>),

    /// Approximate-match constraints outside the supported
    /// `(?:literal){e<=N}` form.
    #[error("fuzzy constraints are only supported as a whole (?:literal){{e<=N}} pattern")]
    UnsupportedFuzzyConstraint,
}

impl From<fancy_regex::Error> for PatternError {
    fn from(err: fancy_regex::Error) -> Self {
        Self::Fancy(err.into())
    }
}

/// Edit counts of an approximate match. All zero for exact engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FuzzyCounts {
    pub substitutions: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl FuzzyCounts {
    pub const fn new(substitutions: usize, insertions: usize, deletions: usize) -> Self {
        Self {
            substitutions,
            insertions,
            deletions,
        }
    }

    /// Total number of edits.
    pub const fn total(&self) -> usize {
        self.substitutions + self.insertions + self.deletions
    }
}

impl From<FuzzyCounts> for (usize, usize, usize) {
    fn from(c: FuzzyCounts) -> Self {
        (c.substitutions, c.insertions, c.deletions)
    }
}

/// A match as reported by an engine: byte range plus edit counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMatch {
    pub start: usize,
    pub end: usize,
    pub counts: FuzzyCounts,
}

impl RawMatch {
    pub const fn exact(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            counts: FuzzyCounts::new(0, 0, 0),
        }
    }
}

/// Anything that can list non-overlapping matches over a text, leftmost
/// first.
pub trait PatternEngine {
    /// # Errors
    ///
    /// Returns [`MatchError::RegexRuntime`] if the engine gives up mid-search.
    fn find_all(&self, text: &str) -> MatchResult<Vec<RawMatch>>;

    /// Source pattern, for logs and errors.
    fn as_str(&self) -> &str;
}

/// A pattern compiled to whichever engine accepts it.
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    Basic(regex::Regex),
    Fancy(fancy_regex::Regex),
    Approximate(ApproxLiteral),
}

impl CompiledPattern {
    /// Compile with the approximate engine if the pattern uses `{e<=N}`
    /// syntax, else `regex`, else `fancy_regex`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::RegexCompile`] carrying the backtracking
    /// engine's error when neither engine accepts the pattern, or
    /// [`PatternError::UnsupportedFuzzyConstraint`] when fuzzy constraints
    /// appear anywhere other than around a whole literal.
    pub fn compile(pattern: &str) -> MatchResult<Self> {
        if let Some(approx) = ApproxLiteral::parse(pattern) {
            debug!(pattern, "compiled approximate literal");
            return Ok(Self::Approximate(approx));
        }
        if has_fuzzy_constraint(pattern) {
            return Err(MatchError::RegexCompile {
                pattern: pattern.to_owned(),
                source: PatternError::UnsupportedFuzzyConstraint,
            });
        }
        regex::Regex::new(pattern)
            .map(Self::Basic)
            .or_else(|_| fancy_regex::Regex::new(pattern).map(Self::Fancy))
            .map_err(|err| MatchError::RegexCompile {
                pattern: pattern.to_owned(),
                source: err.into(),
            })
    }

    pub const fn is_basic(&self) -> bool {
        matches!(self, Self::Basic(_))
    }

    pub const fn is_fancy(&self) -> bool {
        matches!(self, Self::Fancy(_))
    }

    pub const fn is_approximate(&self) -> bool {
        matches!(self, Self::Approximate(_))
    }
}

/// Whether `pattern` contains an unescaped `{e<..}`, `{s<..}`, `{i<..}` or
/// `{d<..}` constraint. Neither exact engine understands these, and
/// `fancy_regex` would silently read them as literal braces.
fn has_fuzzy_constraint(pattern: &str) -> bool {
    pattern.match_indices('{').any(|(i, _)| {
        if pattern[..i].ends_with('\\') {
            return false;
        }
        let rest = pattern[i + 1..].trim_start();
        rest.starts_with(['e', 's', 'i', 'd']) && rest[1..].trim_start().starts_with('<')
    })
}

impl PatternEngine for CompiledPattern {
    fn find_all(&self, text: &str) -> MatchResult<Vec<RawMatch>> {
        match self {
            Self::Basic(re) => Ok(re
                .find_iter(text)
                .map(|m| RawMatch::exact(m.start(), m.end()))
                .collect()),
            Self::Fancy(re) => re
                .find_iter(text)
                .map(|m| {
                    m.map(|m| RawMatch::exact(m.start(), m.end()))
                        .map_err(|err| MatchError::RegexRuntime {
                            pattern: re.as_str().to_owned(),
                            reason: err.to_string(),
                        })
                })
                .collect(),
            Self::Approximate(approx) => approx.find_all(text),
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Self::Basic(re) => re.as_str(),
            Self::Fancy(re) => re.as_str(),
            Self::Approximate(approx) => approx.as_str(),
        }
    }
}
