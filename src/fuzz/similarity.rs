//! Built-in string similarity scorers.
//!
//! Every scorer maps two strings to an integer ratio in `0..=100`. The base
//! measure is the Indel ratio `2 * LCS / (|a| + |b|)` over chars, where the
//! longest common subsequence is read off a Myers diff from the `similar`
//! crate. The other scorers are composed from it: sliding windows (partial),
//! whitespace-token reordering (token sort), token set decomposition (token
//! set) and a length-weighted blend of all of them (weighted).
//!
//! Scores are rounded half-to-even from the exact float value.

use std::collections::BTreeSet;

use similar::{Algorithm, DiffTag, capture_diff_slices};

/// Signature shared by all similarity scorers.
pub type SimilarityFn = fn(&str, &str) -> u8;

const PARTIAL_LEN_RATIO: f64 = 1.5;
const LONG_LEN_RATIO: f64 = 8.0;
const PARTIAL_SCALE: f64 = 0.9;
const LONG_PARTIAL_SCALE: f64 = 0.6;
const UNBASE_SCALE: f64 = 0.95;

/// Number of chars shared by the longest common subsequence of `a` and `b`.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    capture_diff_slices(Algorithm::Myers, a, b)
        .iter()
        .filter(|op| op.tag() == DiffTag::Equal)
        .map(|op| op.old_range().len())
        .sum()
}

/// Unrounded Indel ratio on a `0.0..=100.0` scale.
#[allow(clippy::cast_precision_loss)]
fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(a, b) as f64 / total as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_score(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 100.0) as u8
}

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

// ---------------------------------------------------------------------------
// Character-level scorers
// ---------------------------------------------------------------------------

/// Indel similarity of the two whole strings. Two empty strings score 100.
pub fn ratio(a: &str, b: &str) -> u8 {
    to_score(indel_ratio(&chars(a), &chars(b)))
}

/// Best [`ratio`] of the shorter string against every window of the longer
/// string with the same char length.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a = chars(a);
    let b = chars(b);
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return if long.is_empty() { 100 } else { 0 };
    }

    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        let score = indel_ratio(&short, window);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    to_score(best)
}

// ---------------------------------------------------------------------------
// Token-level scorers
// ---------------------------------------------------------------------------

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// [`ratio`] after sorting whitespace-separated tokens.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// [`partial_ratio`] after sorting whitespace-separated tokens.
pub fn partial_token_sort_ratio(a: &str, b: &str) -> u8 {
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn token_set_with(a: &str, b: &str, scorer: SimilarityFn) -> u8 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0;
    }

    let join = |set: Vec<&str>| set.join(" ");
    let sect = join(tokens_a.intersection(&tokens_b).copied().collect());
    let only_a = join(tokens_a.difference(&tokens_b).copied().collect());
    let only_b = join(tokens_b.difference(&tokens_a).copied().collect());

    let combined_a = format!("{sect} {only_a}").trim().to_owned();
    let combined_b = format!("{sect} {only_b}").trim().to_owned();

    scorer(&sect, &combined_a)
        .max(scorer(&sect, &combined_b))
        .max(scorer(&combined_a, &combined_b))
}

/// Best [`ratio`] among the shared-token string and each side's shared plus
/// unshared tokens.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    token_set_with(a, b, ratio)
}

/// [`token_set_ratio`] scored with [`partial_ratio`].
pub fn partial_token_set_ratio(a: &str, b: &str) -> u8 {
    token_set_with(a, b, partial_ratio)
}

// ---------------------------------------------------------------------------
// Processed scorers
// ---------------------------------------------------------------------------

/// Lowercase, replace non-alphanumerics with spaces, trim.
fn default_process(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_owned()
}

/// [`ratio`] of default-processed strings; 0 if either becomes empty.
pub fn quick_ratio(a: &str, b: &str) -> u8 {
    let a = default_process(a);
    let b = default_process(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    ratio(&a, &b)
}

/// Length-weighted best of the other scorers on default-processed strings.
///
/// Strings of similar length are compared whole and by token order/sets;
/// strings whose lengths differ by 1.5x or more are compared partially, with
/// a heavier discount past 8x.
#[allow(clippy::cast_precision_loss)]
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    let a = default_process(a);
    let b = default_process(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let base = f64::from(ratio(&a, &b));
    let len_a = a.chars().count() as f64;
    let len_b = b.chars().count() as f64;
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    if len_ratio < PARTIAL_LEN_RATIO {
        let sort = f64::from(token_sort_ratio(&a, &b)) * UNBASE_SCALE;
        let set = f64::from(token_set_ratio(&a, &b)) * UNBASE_SCALE;
        return to_score(base.max(sort).max(set));
    }

    let partial_scale = if len_ratio > LONG_LEN_RATIO {
        LONG_PARTIAL_SCALE
    } else {
        PARTIAL_SCALE
    };
    let partial = f64::from(partial_ratio(&a, &b)) * partial_scale;
    let sort = f64::from(partial_token_sort_ratio(&a, &b)) * UNBASE_SCALE * partial_scale;
    let set = f64::from(partial_token_set_ratio(&a, &b)) * UNBASE_SCALE * partial_scale;
    to_score(base.max(partial).max(sort).max(set))
}
