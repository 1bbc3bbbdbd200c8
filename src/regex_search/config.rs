//! Predefined regex pattern library.
//!
//! Patterns are stored as source strings and compiled on lookup, so a config
//! costs nothing until a pattern is used. All built-in patterns are written
//! for the `fancy_regex` dialect; the ones without look-around still compile
//! with plain `regex`.

use std::collections::BTreeMap;

use super::pattern::CompiledPattern;
use crate::error::{MatchError, MatchResult};

const MONTHS: &str = r"jan\.?|january|feb\.?|february|mar\.?|march|apr\.?|april|may|jun\.?|june|jul\.?|july|aug\.?|august|sep\.?|september|oct\.?|october|nov\.?|november|dec\.?|december";

const TLDS: &str = "com|org|net|edu|gov|mil|int|info|biz|name|pro|aero|coop|museum|io|co|ai|app|dev|me|tv|us|uk|ca|de|fr|jp|cn|ru|br|au|in|it|nl|es|se|no|ch|eu|online|site|tech|store|blog|international|construction";

fn dates() -> String {
    format!(
        r"(?i)(?:(?<!:)(?<!:\d)[0-3]?\d(?:st|nd|rd|th)?\s+(?:of\s+)?(?:{MONTHS})|(?:{MONTHS})\s+(?<!:)(?<!:\d)[0-3]?\d(?:st|nd|rd|th)?)(?:,)?\s*(?:\d{{4}})?|[0-3]?\d[-\./][0-3]?\d[-\./]\d{{2,4}}"
    )
}

fn links() -> String {
    format!(
        r#"(?i)(?:https?://|www\d{{0,3}}[.])?[a-z0-9.\-]+[.](?:{TLDS})(?:/[^\s()<>]+[^\s`!()\[\]{{}};:'".,<>?«»“”‘’])?"#
    )
}

const TIMES: &str = r"(?i)\d{1,2}:\d{2} ?(?:[ap]\.?m\.?)?|\d[ap]\.?m\.?";

const PHONES: &str = r"(?:(?<![\d-])(?:\+?\d{1,3}[-.\s*]?)?(?:\(?\d{3}\)?[-.\s*]?)?\d{3}[-.\s*]?\d{4}(?![\d-]))|(?:(?<![\d-])(?:(?:\(\+?\d{2}\))|(?:\+?\d{2}))\s*\d{2}\s*\d{3}\s*\d{4}(?![\d-]))";

const PHONES_WITH_EXTS: &str = r"(?i)(?:(?:\+?1\s*(?:[.-]\s*)?)?(?:\(\s*(?:[2-9]1[02-9]|[2-9][02-8]1|[2-9][02-8][02-9])\s*\)|(?:[2-9]1[02-9]|[2-9][02-8]1|[2-9][02-8][02-9]))\s*(?:[.-]\s*)?)?(?:[2-9]1[02-9]|[2-9][02-9]1|[2-9][02-9]{2})\s*(?:[.-]\s*)?(?:[0-9]{4})(?:\s*(?:#|x\.?|ext\.?|extension)\s*(?:\d+)?)";

const EMAILS: &str = r"(?i)[a-z0-9!#$%&'*+/=?^_`{|.}~-]+@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?";

const IPS: &str = r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";

const IPV6S: &str = r"(?is)\s*(?!.*::.*::)(?:(?!:)|:(?=:))(?:[0-9a-f]{0,4}(?:(?<=::)|(?<!::):)){6}(?:[0-9a-f]{0,4}(?:(?<=::)|(?<!::):)[0-9a-f]{0,4}(?:(?<=::)|(?<!:)|(?<=:)(?<!::):)|(?:25[0-4]|2[0-4]\d|1\d\d|[1-9]?\d)(?:\.(?:25[0-4]|2[0-4]\d|1\d\d|[1-9]?\d)){3})\s*";

const PRICES: &str = r"[$]\s?[+-]?[0-9]{1,3}(?:(?:,?[0-9]{3}))*(?:\.[0-9]{1,2})?";

const HEX_COLORS: &str = r"(?:#(?:[0-9a-fA-F]{8})|#(?:[0-9a-fA-F]{3}){1,2})\b";

const CREDIT_CARDS: &str = r"(?:(?:\d{4}[- ]?){3}\d{4}|\d{15,16})(?!\d)";

const BTC_ADDRESSES: &str = r"(?<![a-km-zA-HJ-NP-Z0-9])[13][a-km-zA-HJ-NP-Z0-9]{26,33}(?![a-km-zA-HJ-NP-Z0-9])";

const STREET_ADDRESSES: &str = r"(?i)\d{1,4} [\w\s]{1,20}(?:street|st|avenue|ave|road|rd|highway|hwy|square|sq|trail|trl|drive|dr|court|ct|park|parkway|pkwy|circle|cir|boulevard|blvd)\W?(?=\s|$)";

const ZIP_CODES: &str = r"\b\d{5}(?:[-\s]\d{4})?\b";

const PO_BOXES: &str = r"(?i)P\.? ?O\.? Box \d+";

const SSN_NUMBER: &str = r"(?!000|666|333)0*(?:[0-6][0-9][0-9]|[0-7][0-6][0-9]|[0-7][0-7][0-2])[- ](?!00)[0-9]{2}[- ](?!0000)[0-9]{4}";

/// The built-in library: `(key, pattern)` pairs.
pub fn common_patterns() -> Vec<(&'static str, String)> {
    vec![
        ("dates", dates()),
        ("times", TIMES.to_owned()),
        ("phones", PHONES.to_owned()),
        ("phones_with_exts", PHONES_WITH_EXTS.to_owned()),
        ("links", links()),
        ("emails", EMAILS.to_owned()),
        ("ips", IPS.to_owned()),
        ("ipv6s", IPV6S.to_owned()),
        ("prices", PRICES.to_owned()),
        ("hex_colors", HEX_COLORS.to_owned()),
        ("credit_cards", CREDIT_CARDS.to_owned()),
        ("btc_addresses", BTC_ADDRESSES.to_owned()),
        ("street_addresses", STREET_ADDRESSES.to_owned()),
        ("zip_codes", ZIP_CODES.to_owned()),
        ("po_boxes", PO_BOXES.to_owned()),
        ("ssn_number", SSN_NUMBER.to_owned()),
    ]
}

/// Named predefined regex patterns.
#[derive(Debug, Clone)]
pub struct RegexConfig {
    predefs: BTreeMap<String, String>,
}

impl Default for RegexConfig {
    /// The common pattern library.
    fn default() -> Self {
        Self {
            predefs: common_patterns()
                .into_iter()
                .map(|(key, pattern)| (key.to_owned(), pattern))
                .collect(),
        }
    }
}

impl RegexConfig {
    /// A config with no predefined patterns.
    pub const fn empty() -> Self {
        Self {
            predefs: BTreeMap::new(),
        }
    }

    /// Add or replace a named pattern.
    #[must_use]
    pub fn with_pattern(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.predefs.insert(name.into(), pattern.into());
        self
    }

    /// Registered pattern names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.predefs.keys().map(String::as_str)
    }

    /// Source of a predefined pattern.
    pub fn predefined(&self, name: &str) -> Option<&str> {
        self.predefs.get(name).map(String::as_str)
    }

    /// Compile `pattern`, or the predefined pattern it names when `predef`
    /// is set.
    ///
    /// # Errors
    ///
    /// [`MatchError::UnknownPredefinedPattern`] for an unknown name,
    /// [`MatchError::RegexCompile`] for a pattern neither engine accepts.
    pub fn parse(&self, pattern: &str, predef: bool) -> MatchResult<CompiledPattern> {
        if !predef {
            return CompiledPattern::compile(pattern);
        }
        let source = self
            .predefined(pattern)
            .ok_or_else(|| MatchError::UnknownPredefinedPattern {
                name: pattern.to_owned(),
            })?;
        CompiledPattern::compile(source)
    }
}
