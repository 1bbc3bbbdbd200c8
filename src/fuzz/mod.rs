//! Token-level fuzzy span search.
//!
//! Finds the span(s) of a [`Document`] whose text most resembles a query
//! document, tolerating spelling variation and OCR noise.
//!
//! # Pipeline
//!
//! 1. **Precheck**: warn if trim rules would strip the query's own edges.
//! 2. **Flex**: resolve how far boundaries may move (query length by default).
//! 3. **Scan**: slide a query-length token window over the document at
//!    stride 1 and keep every start index scoring at least `min_r1`.
//! 4. **Select**: the best start (ties go to the lowest index), or the top
//!    `n` starts ordered by ratio then index.
//! 5. **Optimize**: for `f` in `1..=flex`, grow and shrink the left edge
//!    against the original right edge, and the right edge against the
//!    original left edge. Each edge keeps whichever position strictly beat
//!    its best ratio so far. The two edges never move jointly.
//! 6. **Trim**: strip unwanted edge tokens; a span trimmed to nothing is
//!    dropped.
//! 7. **Accept**: rescore the trimmed span and keep it if it reaches
//!    `min_r2`.
//!
//! Multi-match runs steps 5 to 7 for every selected start, sorts survivors by
//! ratio then start index, and greedily drops spans overlapping an earlier
//! survivor.

pub mod config;
pub mod similarity;
pub mod trim;

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub use config::{Algorithm, Flex, FuzzyConfig, SearchOptions};
pub use similarity::SimilarityFn;
pub use trim::{EdgeTrimmers, TrimFn, TrimRule};

use crate::advisory::{Advisory, Outcome};
use crate::doc::{Document, Span};
use crate::error::{MatchError, MatchResult};

/// Coarse scan results: window start index → ratio.
pub type MatchValues = BTreeMap<usize, u8>;

/// An optimized fuzzy match over tokens `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub start: usize,
    pub end: usize,
    /// Ratio of the final, trimmed span against the query.
    pub ratio: u8,
}

impl Match {
    pub const fn new(start: usize, end: usize, ratio: u8) -> Self {
        Self { start, end, ratio }
    }

    /// Whether the two token ranges share any index.
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The matched span in the document it was produced against.
    pub fn span<'d>(&self, doc: &'d Document) -> Option<Span<'d>> {
        doc.span(self.start, self.end)
    }
}

impl From<Match> for (usize, usize, u8) {
    fn from(m: Match) -> Self {
        (m.start, m.end, m.ratio)
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// A resolved scorer plus case policy.
#[derive(Clone, Copy)]
struct Scorer {
    func: SimilarityFn,
    ignore_case: bool,
}

impl Scorer {
    fn score(self, a: &str, b: &str) -> u8 {
        if self.ignore_case {
            (self.func)(&a.to_lowercase(), &b.to_lowercase())
        } else {
            (self.func)(a, b)
        }
    }
}

/// Everything a search needs after validation, resolved once per call.
struct SearchPlan {
    scorer: Scorer,
    min_r1: u8,
    min_r2: u8,
    flex: usize,
    trimmers: EdgeTrimmers,
    advisories: Vec<Advisory>,
}

// ---------------------------------------------------------------------------
// FuzzySearcher
// ---------------------------------------------------------------------------

/// Fuzzy span searcher bound to an immutable [`FuzzyConfig`].
#[derive(Debug, Clone, Default)]
pub struct FuzzySearcher {
    config: FuzzyConfig,
}

impl FuzzySearcher {
    /// A searcher with every built-in scorer and trim rule.
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_config(config: FuzzyConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &FuzzyConfig {
        &self.config
    }

    /// Score two strings with the named algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::UnknownAlgorithm`] if the algorithm is not
    /// registered in this searcher's config.
    pub fn similarity(
        &self,
        a: &str,
        b: &str,
        algorithm: Algorithm,
        ignore_case: bool,
    ) -> MatchResult<u8> {
        let scorer = Scorer {
            func: self.config.scorer(algorithm)?,
            ignore_case,
        };
        Ok(scorer.score(a, b))
    }

    /// Coarse scan: ratio of every query-length window at or above `min_r1`.
    ///
    /// Empty when the query is longer than the document.
    pub fn scan(
        &self,
        doc: &Document,
        query: &Document,
        algorithm: Algorithm,
        min_r1: u8,
        ignore_case: bool,
    ) -> MatchResult<MatchValues> {
        let scorer = Scorer {
            func: self.config.scorer(algorithm)?,
            ignore_case,
        };
        Ok(scan_with(doc, query, scorer, min_r1))
    }

    /// Flex the boundaries of the window starting at `pos`, trim, and
    /// accept the result if it reaches `options.min_r2`.
    ///
    /// `pos` normally comes from `match_values`; if it does not, the window
    /// is scored afresh.
    pub fn optimize(
        &self,
        doc: &Document,
        query: &Document,
        match_values: &MatchValues,
        pos: usize,
        options: &SearchOptions,
    ) -> MatchResult<Option<Match>> {
        let plan = self.plan(query, options)?;
        if pos + query.len() > doc.len() {
            return Ok(None);
        }
        Ok(optimize_with(doc, query, match_values, pos, &plan))
    }

    /// The single best match, or `None` if nothing clears both thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidQuery`] for an empty query and
    /// [`MatchError::UnknownAlgorithm`] for an unregistered scorer, before
    /// any scanning.
    pub fn best_match(
        &self,
        doc: &Document,
        query: &Document,
        options: &SearchOptions,
    ) -> MatchResult<Outcome<Option<Match>>> {
        let plan = self.plan(query, options)?;
        let values = scan_with(doc, query, plan.scorer, plan.min_r1);
        let best = select_best(&values)
            .and_then(|pos| optimize_with(doc, query, &values, pos, &plan));
        debug!(candidates = values.len(), found = best.is_some(), "best match");
        Ok(Outcome::new(best, plan.advisories))
    }

    /// Up to `n` non-overlapping matches, best first.
    ///
    /// `n == 0` means `len(doc) / len(query) + 2` candidates are optimized.
    pub fn multi_match(
        &self,
        doc: &Document,
        query: &Document,
        n: usize,
        options: &SearchOptions,
    ) -> MatchResult<Outcome<Vec<Match>>> {
        let plan = self.plan(query, options)?;
        let n = if n == 0 {
            doc.len() / query.len() + 2
        } else {
            n
        };

        let values = scan_with(doc, query, plan.scorer, plan.min_r1);
        let mut matches: Vec<Match> = select_top_n(&values, n)
            .into_iter()
            .filter_map(|pos| optimize_with(doc, query, &values, pos, &plan))
            .collect();
        matches.sort_by_key(|m| (Reverse(m.ratio), m.start));
        let matches = filter_overlapping(matches);

        debug!(
            candidates = values.len(),
            n,
            found = matches.len(),
            "multi match"
        );
        Ok(Outcome::new(matches, plan.advisories))
    }

    /// Validate the query and resolve options against the registries.
    fn plan(&self, query: &Document, options: &SearchOptions) -> MatchResult<SearchPlan> {
        if query.is_empty() {
            return Err(MatchError::InvalidQuery {
                reason: "query has no tokens".to_owned(),
            });
        }
        let scorer = Scorer {
            func: self.config.scorer(options.algorithm)?,
            ignore_case: options.ignore_case,
        };
        let trimmers = self.config.edge_trimmers(options);

        let mut advisories = Vec::new();
        advisories.extend(precheck_query(query, &trimmers));
        let (flex, flex_advisory) = compute_flex(query.len(), options.flex);
        advisories.extend(flex_advisory);

        Ok(SearchPlan {
            scorer,
            min_r1: options.min_r1,
            min_r2: options.min_r2,
            flex,
            trimmers,
            advisories,
        })
    }
}

// ---------------------------------------------------------------------------
// Pipeline steps
// ---------------------------------------------------------------------------

fn scan_with(doc: &Document, query: &Document, scorer: Scorer, min_r1: u8) -> MatchValues {
    let window = query.len();
    if window == 0 || window > doc.len() {
        return MatchValues::new();
    }
    let query_text = query.text();
    (0..=doc.len() - window)
        .filter_map(|i| {
            let ratio = scorer.score(query_text, doc.span_text(i, i + window));
            (ratio >= min_r1).then_some((i, ratio))
        })
        .collect()
}

fn optimize_with(
    doc: &Document,
    query: &Document,
    match_values: &MatchValues,
    pos: usize,
    plan: &SearchPlan,
) -> Option<Match> {
    let query_text = query.text();
    let score =
        |start: usize, end: usize| plan.scorer.score(query_text, doc.span_text(start, end));

    let p_l = pos;
    let p_r = pos + query.len();
    let initial = match_values
        .get(&pos)
        .copied()
        .unwrap_or_else(|| score(p_l, p_r));

    let (mut bp_l, mut bmv_l) = (p_l, initial);
    let (mut bp_r, mut bmv_r) = (p_r, initial);

    for f in 1..=plan.flex {
        if let Some(l) = p_l.checked_sub(f) {
            let r = score(l, p_r);
            if r > bmv_l {
                (bp_l, bmv_l) = (l, r);
            }
        }
        if p_l + f < p_r {
            let r = score(p_l + f, p_r);
            if r > bmv_l {
                (bp_l, bmv_l) = (p_l + f, r);
            }
        }
        if let Some(r_edge) = p_r.checked_sub(f).filter(|&edge| edge > p_l) {
            let r = score(p_l, r_edge);
            if r > bmv_r {
                (bp_r, bmv_r) = (r_edge, r);
            }
        }
        if p_r + f <= doc.len() {
            let r = score(p_l, p_r + f);
            if r > bmv_r {
                (bp_r, bmv_r) = (p_r + f, r);
            }
        }
        trace!(f, bp_l, bmv_l, bp_r, bmv_r, "flex step");
    }

    let Some((start, end)) = plan.trimmers.enforce(doc, bp_l, bp_r) else {
        trace!(pos, bp_l, bp_r, "span trimmed away");
        return None;
    };
    let ratio = score(start, end);
    trace!(pos, start, end, ratio, "optimized");
    (ratio >= plan.min_r2).then_some(Match::new(start, end, ratio))
}

/// Resolve flex against the query length.
///
/// An explicit flex larger than the query is clamped, with an advisory.
pub fn compute_flex(query_len: usize, flex: Flex) -> (usize, Option<Advisory>) {
    match flex {
        Flex::Default => (query_len, None),
        Flex::Explicit(requested) if requested > query_len => (
            query_len,
            Some(
                Advisory::FlexTooLarge {
                    requested,
                    query_len,
                }
                .emit(),
            ),
        ),
        Flex::Explicit(requested) => (requested, None),
    }
}

/// Advisory if the trimmers would strip the query's own first or last token.
pub fn precheck_query(query: &Document, trimmers: &EdgeTrimmers) -> Option<Advisory> {
    let (start, end) = trimmers.affects(query);
    (start || end).then(|| Advisory::TrimmableQuery { start, end }.emit())
}

/// Start index with the highest ratio; ties go to the lowest index.
pub fn select_best(match_values: &MatchValues) -> Option<usize> {
    match_values
        .iter()
        .max_by(|(ia, ra), (ib, rb)| ra.cmp(rb).then(ib.cmp(ia)))
        .map(|(&i, _)| i)
}

/// The `n` best start indices by descending ratio then ascending index.
///
/// `n == 0` returns every start index (in index order).
pub fn select_top_n(match_values: &MatchValues, n: usize) -> Vec<usize> {
    if n == 0 {
        return match_values.keys().copied().collect();
    }
    let mut ranked: Vec<(usize, u8)> = match_values.iter().map(|(&i, &r)| (i, r)).collect();
    ranked.sort_by_key(|&(i, r)| (Reverse(r), i));
    ranked.into_iter().take(n).map(|(i, _)| i).collect()
}

/// Greedily keep matches that share no token with an already-kept match.
///
/// Expects input sorted by descending ratio then ascending start.
pub fn filter_overlapping(matches: impl IntoIterator<Item = Match>) -> Vec<Match> {
    let mut kept: Vec<Match> = Vec::new();
    for candidate in matches {
        if !kept.iter().any(|m| m.overlaps(&candidate)) {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(words: &[&str], spaces: &[bool]) -> Document {
        Document::from_words(words, spaces).expect("valid document")
    }

    fn initial_matches() -> MatchValues {
        MatchValues::from([(1, 30), (4, 50), (5, 50), (8, 100), (9, 100)])
    }

    fn shirley_doc() -> Document {
        doc(
            &["Do", "n't", "call", "me", "Sh1rley"],
            &[false, true, true, true, false],
        )
    }

    fn opts(min_r2: u8) -> SearchOptions {
        SearchOptions::default().min_r2(min_r2)
    }

    #[test]
    fn test_similarity_defaults() {
        let searcher = FuzzySearcher::new();
        let r = searcher
            .similarity("spaczz", "spacy", Algorithm::Simple, true)
            .expect("simple is registered");
        assert_eq!(r, 73);
    }

    #[test]
    fn test_similarity_respects_case() {
        let searcher = FuzzySearcher::new();
        let r = searcher
            .similarity("SPACZZ", "spaczz", Algorithm::Simple, false)
            .expect("simple is registered");
        assert_eq!(r, 0);
    }

    #[test]
    fn test_similarity_unknown_in_empty_config() {
        let searcher = FuzzySearcher::with_config(FuzzyConfig::empty());
        let err = searcher
            .similarity("a", "b", Algorithm::Simple, true)
            .expect_err("empty config has no scorers");
        assert!(matches!(err, MatchError::UnknownAlgorithm { .. }));
    }

    #[test]
    fn test_compute_flex_default() {
        assert_eq!(compute_flex(3, Flex::Default), (3, None));
    }

    #[test]
    fn test_compute_flex_passes_valid_value() {
        assert_eq!(compute_flex(3, Flex::Explicit(1)), (1, None));
        assert_eq!(compute_flex(3, Flex::Explicit(0)), (0, None));
    }

    #[test]
    fn test_compute_flex_clamps_with_advisory() {
        let (flex, advisory) = compute_flex(3, Flex::Explicit(5));
        assert_eq!(flex, 3);
        assert_eq!(
            advisory,
            Some(Advisory::FlexTooLarge {
                requested: 5,
                query_len: 3
            })
        );
    }

    #[test]
    fn test_select_best_earliest_max() {
        assert_eq!(select_best(&initial_matches()), Some(8));
        assert_eq!(select_best(&MatchValues::new()), None);
    }

    #[test]
    fn test_select_top_n_ordering() {
        assert_eq!(select_top_n(&initial_matches(), 3), vec![8, 9, 4]);
    }

    #[test]
    fn test_select_top_n_zero_returns_all() {
        let mut all = select_top_n(&initial_matches(), 0);
        all.sort_unstable();
        assert_eq!(all, vec![1, 4, 5, 8, 9]);
    }

    #[test]
    fn test_scan_over_min_r1() {
        let searcher = FuzzySearcher::new();
        let query = doc(&["Shirley"], &[false]);
        let values = searcher
            .scan(&shirley_doc(), &query, Algorithm::Simple, 30, true)
            .expect("scan");
        assert_eq!(values, MatchValues::from([(4, 86)]));
    }

    #[test]
    fn test_scan_without_min_r1() {
        let searcher = FuzzySearcher::new();
        let query = doc(&["Shirley"], &[false]);
        let values = searcher
            .scan(&shirley_doc(), &query, Algorithm::Simple, 0, true)
            .expect("scan");
        assert_eq!(
            values,
            MatchValues::from([(0, 0), (1, 0), (2, 18), (3, 22), (4, 86)])
        );
    }

    #[test]
    fn test_scan_no_matches_is_empty() {
        let searcher = FuzzySearcher::new();
        let query = doc(&["xenomorph"], &[false]);
        let values = searcher
            .scan(&shirley_doc(), &query, Algorithm::Simple, 30, true)
            .expect("scan");
        assert!(values.is_empty());
    }

    #[test]
    fn test_scan_query_longer_than_doc() {
        let searcher = FuzzySearcher::new();
        let short = doc(&["Shirley"], &[false]);
        let values = searcher
            .scan(&short, &shirley_doc(), Algorithm::Simple, 0, true)
            .expect("scan");
        assert!(values.is_empty());
    }

    #[test]
    fn test_optimize_finds_better_match() {
        let searcher = FuzzySearcher::new();
        let d = doc(
            &["Patient", "was", "prescribed", "Zithromax", "tablets", "."],
            &[true, true, true, true, false, false],
        );
        let query = doc(&["zithromax", "tablet"], &[true, false]);
        let values = MatchValues::from([(0, 30), (2, 50), (3, 97), (4, 50)]);
        let m = searcher
            .optimize(&d, &query, &values, 3, &opts(70).flex(Flex::Explicit(2)))
            .expect("optimize");
        assert_eq!(m, Some(Match::new(3, 5, 97)));
    }

    #[test]
    fn test_optimize_moves_left_edge() {
        let searcher = FuzzySearcher::new();
        let d = doc(
            &[
                "There",
                "was",
                "a",
                "great",
                "basketball",
                "player",
                "named",
                ":",
                "Karem",
                "Abdul",
                "Jabar",
            ],
            &[
                true, true, true, true, true, true, false, true, true, true, false,
            ],
        );
        let query = doc(
            &["Kareem", "Abdul", "-", "Jabbar"],
            &[true, false, false, false],
        );
        let values =
            MatchValues::from([(0, 33), (1, 39), (2, 41), (3, 33), (5, 37), (6, 59), (7, 84)]);
        let m = searcher
            .optimize(&d, &query, &values, 7, &opts(70).flex(Flex::Explicit(4)))
            .expect("optimize");
        assert_eq!(m, Some(Match::new(8, 11, 89)));
    }

    #[test]
    fn test_optimize_without_flex_returns_window() {
        let searcher = FuzzySearcher::new();
        let d = doc(
            &["Patient", "was", "prescribed", "Zithroma", "tablets", "."],
            &[true, true, true, true, false, false],
        );
        let query = doc(&["zithromax"], &[false]);
        let values = MatchValues::from([(3, 94)]);
        let m = searcher
            .optimize(&d, &query, &values, 3, &opts(70).flex(Flex::Explicit(0)))
            .expect("optimize");
        assert_eq!(m, Some(Match::new(3, 4, 94)));
    }

    #[test]
    fn test_optimize_below_min_r2() {
        let searcher = FuzzySearcher::new();
        let d = doc(
            &["Patient", "was", "prescribed", "Zithroma", "tablets", "."],
            &[true, true, true, true, false, false],
        );
        let query = doc(&["zithromax"], &[false]);
        let values = MatchValues::from([(3, 94)]);
        let m = searcher
            .optimize(&d, &query, &values, 3, &opts(95).flex(Flex::Explicit(0)))
            .expect("optimize");
        assert_eq!(m, None);
    }

    #[test]
    fn test_optimize_trimmed_away() {
        let searcher = FuzzySearcher::new();
        let d = doc(&["hello", ",", "world"], &[false, true, false]);
        let query = doc(&["!"], &[false]);
        let values = MatchValues::from([(1, 0)]);
        let options = opts(0)
            .flex(Flex::Explicit(0))
            .trimmers([TrimRule::Punct]);
        let m = searcher
            .optimize(&d, &query, &values, 1, &options)
            .expect("optimize");
        assert_eq!(m, None);
    }

    #[test]
    fn test_filter_overlapping_keeps_first() {
        let matches = vec![Match::new(1, 2, 80), Match::new(1, 3, 70)];
        assert_eq!(filter_overlapping(matches), vec![Match::new(1, 2, 80)]);
    }

    #[test]
    fn test_filter_overlapping_keeps_disjoint() {
        let matches = vec![
            Match::new(4, 6, 90),
            Match::new(5, 7, 85),
            Match::new(0, 2, 80),
            Match::new(2, 4, 75),
        ];
        assert_eq!(
            filter_overlapping(matches),
            vec![Match::new(4, 6, 90), Match::new(0, 2, 80), Match::new(2, 4, 75)]
        );
    }

    #[test]
    fn test_precheck_query_flags_trimmable_edges() {
        let query = doc(&["the", "query", "."], &[true, false, false]);
        let config = FuzzyConfig::default();
        let trimmers =
            config.edge_trimmers(&SearchOptions::default().end_trimmers([TrimRule::Punct]));
        assert_eq!(
            precheck_query(&query, &trimmers),
            Some(Advisory::TrimmableQuery {
                start: false,
                end: true
            })
        );
        assert_eq!(precheck_query(&query, &EdgeTrimmers::default()), None);
    }

    #[test]
    fn test_empty_query_rejected() {
        let searcher = FuzzySearcher::new();
        let empty = Document::new(Vec::new()).expect("empty document is valid");
        let err = searcher
            .best_match(&shirley_doc(), &empty, &SearchOptions::default())
            .expect_err("empty query");
        assert!(matches!(err, MatchError::InvalidQuery { .. }));
    }
}
