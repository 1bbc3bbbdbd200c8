//! Registries and search options for the fuzzy searcher.
//!
//! [`FuzzyConfig`] maps enumerated keys to function values: similarity
//! scorers keyed by [`Algorithm`] and trim predicates keyed by [`TrimRule`].
//! A config is built once and only read afterwards.
//!
//! [`SearchOptions`] carries the per-call knobs and deserializes from JSON
//! with camelCase keys, so a host can keep search presets in its own config
//! files.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::similarity::{self, SimilarityFn};
use super::trim::{EdgeTrimmers, TrimFn, TrimRule, union_rules};
use crate::error::{MatchError, MatchResult};

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

/// Names of the built-in similarity scorers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[default]
    Simple,
    Partial,
    TokenSort,
    TokenSet,
    PartialTokenSort,
    PartialTokenSet,
    #[serde(alias = "u_quick")]
    Quick,
    #[serde(alias = "u_weighted")]
    Weighted,
}

impl Algorithm {
    pub const ALL: [Self; 8] = [
        Self::Simple,
        Self::Partial,
        Self::TokenSort,
        Self::TokenSet,
        Self::PartialTokenSort,
        Self::PartialTokenSet,
        Self::Quick,
        Self::Weighted,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Partial => "partial",
            Self::TokenSort => "token_sort",
            Self::TokenSet => "token_set",
            Self::PartialTokenSort => "partial_token_sort",
            Self::PartialTokenSet => "partial_token_set",
            Self::Quick => "quick",
            Self::Weighted => "weighted",
        }
    }

    /// The built-in scorer for this algorithm.
    pub const fn scorer(self) -> SimilarityFn {
        match self {
            Self::Simple => similarity::ratio,
            Self::Partial => similarity::partial_ratio,
            Self::TokenSort => similarity::token_sort_ratio,
            Self::TokenSet => similarity::token_set_ratio,
            Self::PartialTokenSort => similarity::partial_token_sort_ratio,
            Self::PartialTokenSet => similarity::partial_token_set_ratio,
            Self::Quick => similarity::quick_ratio,
            Self::Weighted => similarity::weighted_ratio,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = match s {
            "u_quick" => "quick",
            "u_weighted" => "weighted",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|alg| alg.name() == name)
            .ok_or_else(|| MatchError::UnknownAlgorithm { name: s.to_owned() })
    }
}

// ---------------------------------------------------------------------------
// FuzzyConfig
// ---------------------------------------------------------------------------

/// Similarity-scorer and trim-predicate registries.
#[derive(Debug, Clone)]
pub struct FuzzyConfig {
    scorers: HashMap<Algorithm, SimilarityFn>,
    trimmers: HashMap<TrimRule, TrimFn>,
}

impl Default for FuzzyConfig {
    /// All built-in scorers and trim rules.
    fn default() -> Self {
        Self {
            scorers: Algorithm::ALL
                .into_iter()
                .map(|alg| (alg, alg.scorer()))
                .collect(),
            trimmers: TrimRule::ALL
                .into_iter()
                .map(|rule| (rule, rule.predicate()))
                .collect(),
        }
    }
}

impl FuzzyConfig {
    /// A config with no scorers and no trim rules.
    pub fn empty() -> Self {
        Self {
            scorers: HashMap::new(),
            trimmers: HashMap::new(),
        }
    }

    /// Register (or replace) the scorer for `algorithm`.
    #[must_use]
    pub fn with_scorer(mut self, algorithm: Algorithm, scorer: SimilarityFn) -> Self {
        self.scorers.insert(algorithm, scorer);
        self
    }

    /// Register (or replace) the predicate for `rule`.
    #[must_use]
    pub fn with_trim_rule(mut self, rule: TrimRule, predicate: TrimFn) -> Self {
        self.trimmers.insert(rule, predicate);
        self
    }

    pub fn has_scorers(&self) -> bool {
        !self.scorers.is_empty()
    }

    pub fn has_trim_rules(&self) -> bool {
        !self.trimmers.is_empty()
    }

    /// Look up the scorer registered for `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::UnknownAlgorithm`] if nothing is registered.
    pub fn scorer(&self, algorithm: Algorithm) -> MatchResult<SimilarityFn> {
        self.scorers
            .get(&algorithm)
            .copied()
            .ok_or_else(|| MatchError::UnknownAlgorithm {
                name: algorithm.name().to_owned(),
            })
    }

    /// Resolve the start and end predicates for a search.
    ///
    /// Rules missing from this registry are skipped.
    pub fn edge_trimmers(&self, options: &SearchOptions) -> EdgeTrimmers {
        let resolve = |directional: &[TrimRule]| -> Vec<TrimFn> {
            union_rules(&options.trimmers, directional)
                .into_iter()
                .filter_map(|rule| {
                    let predicate = self.trimmers.get(&rule).copied();
                    if predicate.is_none() {
                        debug!(rule = %rule, "trim rule not registered, skipping");
                    }
                    predicate
                })
                .collect()
        };
        EdgeTrimmers {
            start: resolve(&options.start_trimmers),
            end: resolve(&options.end_trimmers),
        }
    }
}

// ---------------------------------------------------------------------------
// Flex
// ---------------------------------------------------------------------------

/// How far span boundaries may move during optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "FlexRepr")]
pub enum Flex {
    /// Use the query length.
    #[default]
    Default,
    /// Use this many tokens, clamped to the query length.
    Explicit(usize),
}

impl FromStr for Flex {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "default" {
            return Ok(Self::Default);
        }
        s.parse::<usize>()
            .map(Self::Explicit)
            .map_err(|_| MatchError::InvalidFlex {
                value: s.to_owned(),
            })
    }
}

impl From<usize> for Flex {
    fn from(value: usize) -> Self {
        Self::Explicit(value)
    }
}

/// Accepts the keyword `"default"`, a numeric string or a non-negative
/// integer.
impl TryFrom<&Value> for Flex {
    type Error = MatchError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => s.parse(),
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .map(Self::Explicit)
                .ok_or_else(|| MatchError::InvalidFlex {
                    value: n.to_string(),
                }),
            other => Err(MatchError::InvalidFlex {
                value: other.to_string(),
            }),
        }
    }
}

/// Wire shape of [`Flex`]: the keyword `"default"` or an integer.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum FlexRepr {
    Count(u64),
    Keyword(&'static str),
}

impl From<Flex> for FlexRepr {
    fn from(flex: Flex) -> Self {
        match flex {
            Flex::Default => Self::Keyword("default"),
            Flex::Explicit(n) => Self::Count(u64::try_from(n).unwrap_or(u64::MAX)),
        }
    }
}

// ---------------------------------------------------------------------------
// SearchOptions
// ---------------------------------------------------------------------------

const fn default_min_r1() -> u8 {
    30
}

const fn default_min_r2() -> u8 {
    75
}

const fn default_ignore_case() -> bool {
    true
}

/// Per-call parameters for [`FuzzySearcher`](super::FuzzySearcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawSearchOptions")]
pub struct SearchOptions {
    /// Scorer used for every comparison.
    pub algorithm: Algorithm,
    /// Minimum ratio for a window to survive the coarse scan.
    pub min_r1: u8,
    /// Minimum ratio for an optimized, trimmed span to be returned.
    pub min_r2: u8,
    /// Lower-case both strings before scoring.
    pub ignore_case: bool,
    pub flex: Flex,
    /// Rules applied to both span edges.
    pub trimmers: Vec<TrimRule>,
    /// Rules applied to the start edge only.
    pub start_trimmers: Vec<TrimRule>,
    /// Rules applied to the end edge only.
    pub end_trimmers: Vec<TrimRule>,
}

/// JSON shape of [`SearchOptions`] before names are resolved, so that bad
/// names surface as their own error variants rather than as JSON errors.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSearchOptions {
    #[serde(default)]
    algorithm: Option<String>,
    #[serde(default = "default_min_r1")]
    min_r1: u8,
    #[serde(default = "default_min_r2")]
    min_r2: u8,
    #[serde(default = "default_ignore_case")]
    ignore_case: bool,
    #[serde(default)]
    flex: Option<Value>,
    #[serde(default)]
    trimmers: Vec<String>,
    #[serde(default)]
    start_trimmers: Vec<String>,
    #[serde(default)]
    end_trimmers: Vec<String>,
}

fn parse_rules(names: &[String]) -> MatchResult<Vec<TrimRule>> {
    names.iter().map(|name| name.parse()).collect()
}

impl TryFrom<RawSearchOptions> for SearchOptions {
    type Error = MatchError;

    fn try_from(raw: RawSearchOptions) -> Result<Self, Self::Error> {
        Ok(Self {
            algorithm: raw
                .algorithm
                .as_deref()
                .map_or(Ok(Algorithm::default()), str::parse::<Algorithm>)?,
            min_r1: raw.min_r1,
            min_r2: raw.min_r2,
            ignore_case: raw.ignore_case,
            flex: raw.flex.as_ref().map_or(Ok(Flex::Default), Flex::try_from)?,
            trimmers: parse_rules(&raw.trimmers)?,
            start_trimmers: parse_rules(&raw.start_trimmers)?,
            end_trimmers: parse_rules(&raw.end_trimmers)?,
        })
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::for_best_match()
    }
}

impl SearchOptions {
    /// Defaults tuned for a single best match (`min_r1 = 30`).
    pub const fn for_best_match() -> Self {
        Self {
            algorithm: Algorithm::Simple,
            min_r1: default_min_r1(),
            min_r2: default_min_r2(),
            ignore_case: default_ignore_case(),
            flex: Flex::Default,
            trimmers: Vec::new(),
            start_trimmers: Vec::new(),
            end_trimmers: Vec::new(),
        }
    }

    /// Defaults tuned for multiple matches (`min_r1 = 25`).
    pub const fn for_multi_match() -> Self {
        let mut options = Self::for_best_match();
        options.min_r1 = 25;
        options
    }

    /// Parse options from a JSON object. Missing keys take best-match
    /// defaults.
    ///
    /// # Errors
    ///
    /// [`MatchError::UnknownAlgorithm`], [`MatchError::UnknownTrimRule`] or
    /// [`MatchError::InvalidFlex`] for bad values, [`MatchError::Json`] for
    /// malformed JSON or out-of-range thresholds.
    pub fn from_json(json: &str) -> MatchResult<Self> {
        let raw: RawSearchOptions = serde_json::from_str(json)?;
        raw.try_into()
    }

    #[must_use]
    pub const fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    #[must_use]
    pub const fn min_r1(mut self, min_r1: u8) -> Self {
        self.min_r1 = min_r1;
        self
    }

    #[must_use]
    pub const fn min_r2(mut self, min_r2: u8) -> Self {
        self.min_r2 = min_r2;
        self
    }

    #[must_use]
    pub const fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    #[must_use]
    pub const fn flex(mut self, flex: Flex) -> Self {
        self.flex = flex;
        self
    }

    #[must_use]
    pub fn trimmers(mut self, rules: impl IntoIterator<Item = TrimRule>) -> Self {
        self.trimmers = rules.into_iter().collect();
        self
    }

    #[must_use]
    pub fn start_trimmers(mut self, rules: impl IntoIterator<Item = TrimRule>) -> Self {
        self.start_trimmers = rules.into_iter().collect();
        self
    }

    #[must_use]
    pub fn end_trimmers(mut self, rules: impl IntoIterator<Item = TrimRule>) -> Self {
        self.end_trimmers = rules.into_iter().collect();
        self
    }
}
