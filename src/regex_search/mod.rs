//! Multi-token regex matching.
//!
//! Regex runs over the document's full text at the character level; every
//! hit is then projected back onto token boundaries. A hit that starts or
//! ends inside a token is either widened to the enclosing tokens (partial
//! mode) or dropped.

pub mod approx;
pub mod config;
pub mod pattern;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub use approx::ApproxLiteral;
pub use config::RegexConfig;
pub use pattern::{CompiledPattern, FuzzyCounts, PatternEngine, PatternError, RawMatch};

use crate::doc::Document;
use crate::error::MatchResult;

/// A regex hit over tokens `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegexMatch {
    pub start: usize,
    pub end: usize,
    pub fuzzy_counts: FuzzyCounts,
}

impl RegexMatch {
    pub const fn new(start: usize, end: usize, fuzzy_counts: FuzzyCounts) -> Self {
        Self {
            start,
            end,
            fuzzy_counts,
        }
    }
}

/// Regex searcher bound to a predefined pattern library.
#[derive(Debug, Clone, Default)]
pub struct RegexSearcher {
    config: RegexConfig,
}

impl RegexSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_config(config: RegexConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &RegexConfig {
        &self.config
    }

    /// All token-aligned matches of `pattern` in `doc`, in text order.
    ///
    /// With `predef` set, `pattern` names a pattern in this searcher's
    /// config. With `partial` set, hits that cut through a token are widened
    /// to cover it; otherwise they are dropped.
    ///
    /// # Errors
    ///
    /// Fails with [`MatchError::UnknownPredefinedPattern`] or
    /// [`MatchError::RegexCompile`] before searching, and with
    /// [`MatchError::RegexRuntime`] if the backtracking engine gives up.
    ///
    /// [`MatchError::UnknownPredefinedPattern`]: crate::MatchError::UnknownPredefinedPattern
    /// [`MatchError::RegexCompile`]: crate::MatchError::RegexCompile
    /// [`MatchError::RegexRuntime`]: crate::MatchError::RegexRuntime
    pub fn find_matches(
        &self,
        doc: &Document,
        pattern: &str,
        partial: bool,
        predef: bool,
    ) -> MatchResult<Vec<RegexMatch>> {
        let compiled = self.config.parse(pattern, predef)?;
        Self::find_with(doc, &compiled, partial)
    }

    /// Like [`find_matches`](Self::find_matches) with an already built
    /// engine.
    pub fn find_with<E: PatternEngine + ?Sized>(
        doc: &Document,
        engine: &E,
        partial: bool,
    ) -> MatchResult<Vec<RegexMatch>> {
        let raw = engine.find_all(doc.text())?;
        let matches: Vec<RegexMatch> = raw
            .iter()
            .filter_map(|hit| {
                let aligned = align(doc, hit, partial);
                if aligned.is_none() {
                    trace!(start = hit.start, end = hit.end, "regex hit not aligned, dropped");
                }
                aligned.map(|(start, end)| RegexMatch::new(start, end, hit.counts))
            })
            .collect();
        debug!(
            pattern = engine.as_str(),
            hits = raw.len(),
            matches = matches.len(),
            "regex search"
        );
        Ok(matches)
    }
}

/// Map a byte-range hit to a token range.
fn align(doc: &Document, hit: &RawMatch, partial: bool) -> Option<(usize, usize)> {
    if hit.start >= hit.end {
        return None;
    }
    if let Some(span) = doc.char_span(hit.start, hit.end) {
        return Some((span.start(), span.end()));
    }
    if !partial {
        return None;
    }
    let map = doc.char_map();
    let first = map.token_at(hit.start)?;
    let last = map.token_at(hit.end - 1)?;
    Some((first, last + 1))
}
