//! Span edge trimming.
//!
//! After optimization a match span may start or end on tokens nobody wants
//! in an annotation: whitespace, punctuation, stop words. Trim rules are
//! per-token predicates; the start edge advances and the end edge retreats
//! while any active predicate holds. A span trimmed down to nothing is
//! dropped rather than returned empty.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::doc::{Document, Token};
use crate::error::MatchError;

/// Signature of a trim predicate.
pub type TrimFn = fn(&Token) -> bool;

/// Names of the built-in trim rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimRule {
    Space,
    Punct,
    Stop,
}

impl TrimRule {
    pub const ALL: [Self; 3] = [Self::Space, Self::Punct, Self::Stop];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::Punct => "punct",
            Self::Stop => "stop",
        }
    }

    /// The built-in predicate for this rule.
    pub const fn predicate(self) -> TrimFn {
        match self {
            Self::Space => Token::is_space,
            Self::Punct => Token::is_punct,
            Self::Stop => Token::is_stop,
        }
    }
}

impl fmt::Display for TrimRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrimRule {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rule| rule.name() == s)
            .ok_or_else(|| MatchError::UnknownTrimRule { name: s.to_owned() })
    }
}

/// Union of direction-agnostic and direction-specific rules, deduplicated.
pub fn union_rules(agnostic: &[TrimRule], directional: &[TrimRule]) -> BTreeSet<TrimRule> {
    agnostic.iter().chain(directional).copied().collect()
}

/// Predicates resolved for each span edge.
#[derive(Debug, Clone, Default)]
pub struct EdgeTrimmers {
    pub start: Vec<TrimFn>,
    pub end: Vec<TrimFn>,
}

impl EdgeTrimmers {
    pub fn is_empty(&self) -> bool {
        self.start.is_empty() && self.end.is_empty()
    }

    /// Whether the query's own first/last tokens would be trimmed.
    pub fn affects(&self, query: &Document) -> (bool, bool) {
        let start = query
            .tokens()
            .first()
            .is_some_and(|token| any_holds(&self.start, token));
        let end = query
            .tokens()
            .last()
            .is_some_and(|token| any_holds(&self.end, token));
        (start, end)
    }

    /// Apply start trimming, then end trimming, to `[bp_l, bp_r)`.
    ///
    /// Returns `None` when either edge collapses onto the other.
    pub fn enforce(&self, doc: &Document, bp_l: usize, bp_r: usize) -> Option<(usize, usize)> {
        let bp_l = enforce_start(doc, bp_l, bp_r, &self.start)?;
        let bp_r = enforce_end(doc, bp_l, bp_r, &self.end)?;
        Some((bp_l, bp_r))
    }
}

fn any_holds(predicates: &[TrimFn], token: &Token) -> bool {
    predicates.iter().any(|predicate| predicate(token))
}

/// Advance `bp_l` past tokens matching any predicate.
///
/// Returns `None` if `bp_l` reaches `bp_r`, or if `bp_r` lies past the end
/// of the document.
pub fn enforce_start(
    doc: &Document,
    mut bp_l: usize,
    bp_r: usize,
    predicates: &[TrimFn],
) -> Option<usize> {
    if bp_r > doc.len() {
        return None;
    }
    while bp_l < bp_r && any_holds(predicates, &doc[bp_l]) {
        bp_l += 1;
    }
    (bp_l < bp_r).then_some(bp_l)
}

/// Retreat `bp_r` past tokens matching any predicate.
///
/// Returns `None` if `bp_r` would reach `bp_l`, or if `bp_r` lies past the
/// end of the document.
pub fn enforce_end(
    doc: &Document,
    bp_l: usize,
    mut bp_r: usize,
    predicates: &[TrimFn],
) -> Option<usize> {
    if bp_l >= bp_r || bp_r > doc.len() {
        return None;
    }
    while any_holds(predicates, &doc[bp_r - 1]) {
        if bp_r - 1 <= bp_l {
            return None;
        }
        bp_r -= 1;
    }
    Some(bp_r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(words: &[&str], spaces: &[bool]) -> Document {
        Document::from_words(words, spaces).expect("valid document")
    }

    fn stop_doc() -> Document {
        let words = ["this", "starts", "with", "a", "stop", "word"];
        Document::new(
            words
                .iter()
                .map(|w| Token::new(*w, true).with_stop(matches!(*w, "this" | "with" | "a"))),
        )
        .expect("valid document")
    }

    #[test]
    fn test_parse_rule_names() {
        assert_eq!("punct".parse::<TrimRule>().ok(), Some(TrimRule::Punct));
        let err = "vowel".parse::<TrimRule>().expect_err("unknown rule");
        assert!(matches!(err, MatchError::UnknownTrimRule { .. }));
    }

    #[test]
    fn test_union_dedups() {
        let rules = union_rules(&[TrimRule::Punct, TrimRule::Space], &[TrimRule::Punct]);
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_enforce_start_skips_stop_word() {
        let d = stop_doc();
        let stop = [TrimRule::Stop.predicate()];
        assert_eq!(enforce_start(&d, 0, 2, &stop), Some(1));
        assert_eq!(enforce_start(&d, 2, 4, &stop), None);
    }

    #[test]
    fn test_enforce_end_drops_punct() {
        let d = doc(
            &["we", "do", "n't", "want", "no", "punctuation", "."],
            &[true, false, true, true, true, false, false],
        );
        let punct = [TrimRule::Punct.predicate()];
        assert_eq!(enforce_end(&d, 5, 7, &punct), Some(6));
        assert_eq!(enforce_end(&d, 6, 7, &punct), None);
    }

    #[test]
    fn test_enforce_both_edges() {
        let d = doc(
            &[
                "The", "token", "we", "are", "looking", "for", "is", ":", "xenomorph", ".",
            ],
            &[true, true, true, true, true, true, false, true, false, false],
        );
        let punct = TrimRule::Punct.predicate();
        let trimmers = EdgeTrimmers {
            start: vec![punct],
            end: vec![punct],
        };
        assert_eq!(trimmers.enforce(&d, 7, 10), Some((8, 9)));
    }

    #[test]
    fn test_enforce_end_runs_from_index_zero() {
        let d = doc(&["Hello", "!"], &[false, false]);
        let punct = TrimRule::Punct.predicate();
        let trimmers = EdgeTrimmers {
            start: vec![punct],
            end: vec![punct],
        };
        assert_eq!(trimmers.enforce(&d, 0, 2), Some((0, 1)));
    }

    #[test]
    fn test_out_of_range_edges_are_rejected() {
        let d = doc(&["Hello", "!"], &[false, false]);
        let punct = [TrimRule::Punct.predicate()];
        assert_eq!(enforce_start(&d, 0, 3, &punct), None);
        assert_eq!(enforce_end(&d, 0, 3, &punct), None);
        assert_eq!(enforce_end(&d, 5, 9, &punct), None);
        let trimmers = EdgeTrimmers {
            start: punct.to_vec(),
            end: punct.to_vec(),
        };
        assert_eq!(trimmers.enforce(&d, 1, 4), None);
    }

    #[test]
    fn test_no_predicates_is_identity() {
        let d = doc(&[".", ","], &[false, false]);
        assert_eq!(EdgeTrimmers::default().enforce(&d, 0, 2), Some((0, 2)));
    }

    #[test]
    fn test_affects_query() {
        let query = doc(&["the", "query", "."], &[true, false, false]);
        let trimmers = EdgeTrimmers {
            start: vec![TrimRule::Punct.predicate()],
            end: vec![TrimRule::Punct.predicate()],
        };
        assert_eq!(trimmers.affects(&query), (false, true));
    }
}
