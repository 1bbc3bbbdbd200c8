//! Approximate literal matching with a bounded edit budget.
//!
//! Handles patterns of the form `(?:literal){e<=N}` (optionally prefixed
//! with `(?i)`): find non-overlapping substrings of the text within `N`
//! edits of `literal`. Edits are counted per char as substitutions,
//! insertions (text chars absent from the literal) and deletions (literal
//! chars absent from the text).
//!
//! For each match the first start index with any acceptable alignment is
//! located, then every start up to `N` chars further on is considered and
//! the cheapest wins (earliest on ties). For that start the cheapest end
//! wins, and the longest end among equally cheap ones.

use std::iter;

use super::pattern::{FuzzyCounts, PatternEngine, RawMatch};
use crate::error::MatchResult;

const META_CHARS: &str = ".^$|?*+()[]{}";

/// A literal searched for with up to `max_edits` edits.
#[derive(Debug, Clone)]
pub struct ApproxLiteral {
    source: String,
    literal: Vec<char>,
    max_edits: usize,
    ignore_case: bool,
}

impl ApproxLiteral {
    pub fn new(literal: &str, max_edits: usize, ignore_case: bool) -> Self {
        let flags = if ignore_case { "(?i)" } else { "" };
        Self {
            source: format!("{flags}(?:{}){{e<={max_edits}}}", escape(literal)),
            literal: literal.chars().collect(),
            max_edits,
            ignore_case,
        }
    }

    /// Recognize `[(?i)](?:literal){e<=N}` or `[(?i)](literal){e<=N}`.
    ///
    /// Returns `None` for anything else, including literals that contain
    /// unescaped regex syntax or are empty.
    pub fn parse(pattern: &str) -> Option<Self> {
        let (ignore_case, rest) = pattern
            .strip_prefix("(?i)")
            .map_or((false, pattern), |rest| (true, rest));
        let (group, budget) = rest.rsplit_once("){e<=")?;
        let max_edits = budget.strip_suffix('}')?.parse().ok()?;
        let inner = group
            .strip_prefix("(?:")
            .or_else(|| group.strip_prefix('('))?;
        let literal = unescape(inner)?;
        if literal.is_empty() {
            return None;
        }
        Some(Self {
            source: pattern.to_owned(),
            literal,
            max_edits,
            ignore_case,
        })
    }

    pub const fn max_edits(&self) -> usize {
        self.max_edits
    }

    fn chars_eq(&self, a: char, b: char) -> bool {
        a == b || (self.ignore_case && a.to_lowercase().eq(b.to_lowercase()))
    }

    /// Cheapest non-empty alignment of the literal against a prefix of
    /// `text`: `(prefix_len, counts)`, or `None` if every alignment exceeds
    /// the budget.
    fn best_end(&self, text: &[char]) -> Option<(usize, FuzzyCounts)> {
        let m = self.literal.len();
        let cols = text.len().min(m + self.max_edits);
        if cols == 0 {
            return None;
        }

        // dist[i][j]: edits turning literal[..i] into text[..j].
        let mut dist = vec![vec![0_usize; cols + 1]; m + 1];
        for (j, cell) in dist[0].iter_mut().enumerate() {
            *cell = j;
        }
        for i in 1..=m {
            dist[i][0] = i;
            for j in 1..=cols {
                let sub = usize::from(!self.chars_eq(self.literal[i - 1], text[j - 1]));
                dist[i][j] = (dist[i - 1][j - 1] + sub)
                    .min(dist[i][j - 1] + 1)
                    .min(dist[i - 1][j] + 1);
            }
        }

        let (end, cost) = (1..=cols)
            .map(|j| (j, dist[m][j]))
            .filter(|&(_, cost)| cost <= self.max_edits)
            .min_by_key(|&(j, cost)| (cost, std::cmp::Reverse(j)))?;
        debug_assert_eq!(cost, dist[m][end]);
        Some((end, self.traceback(&dist, text, end)))
    }

    fn traceback(&self, dist: &[Vec<usize>], text: &[char], end: usize) -> FuzzyCounts {
        let mut counts = FuzzyCounts::default();
        let (mut i, mut j) = (self.literal.len(), end);
        while i > 0 || j > 0 {
            if i > 0 && j > 0 {
                let sub = usize::from(!self.chars_eq(self.literal[i - 1], text[j - 1]));
                if dist[i][j] == dist[i - 1][j - 1] + sub {
                    counts.substitutions += sub;
                    i -= 1;
                    j -= 1;
                    continue;
                }
            }
            if j > 0 && dist[i][j] == dist[i][j - 1] + 1 {
                counts.insertions += 1;
                j -= 1;
            } else {
                counts.deletions += 1;
                i -= 1;
            }
        }
        counts
    }
}

impl PatternEngine for ApproxLiteral {
    /// Non-overlapping matches, leftmost first, as byte ranges.
    fn find_all(&self, text: &str) -> MatchResult<Vec<RawMatch>> {
        let chars: Vec<char> = text.chars().collect();
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(b, _)| b)
            .chain(iter::once(text.len()))
            .collect();

        let mut matches = Vec::new();
        let mut pos = 0;
        while pos < chars.len() {
            let Some(first) = (pos..chars.len()).find(|&s| self.best_end(&chars[s..]).is_some())
            else {
                break;
            };
            let last = (first + self.max_edits).min(chars.len() - 1);
            let Some((start, len, counts)) = (first..=last)
                .filter_map(|s| self.best_end(&chars[s..]).map(|(len, c)| (s, len, c)))
                .min_by_key(|&(s, _, c)| (c.total(), s))
            else {
                break;
            };
            matches.push(RawMatch {
                start: offsets[start],
                end: offsets[start + len],
                counts,
            });
            pos = start + len;
        }
        Ok(matches)
    }

    fn as_str(&self) -> &str {
        &self.source
    }
}

fn unescape(inner: &str) -> Option<Vec<char>> {
    let mut literal = Vec::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next()?;
                if escaped.is_alphanumeric() {
                    return None;
                }
                literal.push(escaped);
            }
            c if META_CHARS.contains(c) => return None,
            c => literal.push(c),
        }
    }
    Some(literal)
}

fn escape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        if META_CHARS.contains(c) || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
