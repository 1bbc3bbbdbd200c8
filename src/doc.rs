//! Token, document and span model.
//!
//! Tokenization is the caller's job: a [`Document`] is built from tokens that
//! already carry their text, trailing-whitespace flag and lexical attributes.
//! The document derives its full text by concatenating each token's text and
//! trailing space, so token byte offsets (`idx`) always point into
//! [`Document::text`].

use std::ops::Index;
use std::sync::OnceLock;

use unicode_general_category::{GeneralCategory, get_general_category};

use crate::error::{MatchError, MatchResult};

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// Atomic unit of a document.
///
/// Position fields (`i`, `idx`) are assigned when the token is placed into a
/// [`Document`]; a free-standing token reports zero for both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: String,
    whitespace: bool,
    i: usize,
    idx: usize,
    is_space: bool,
    is_punct: bool,
    is_stop: bool,
}

impl Token {
    /// Create a token, deriving `is_space` and `is_punct` from its text.
    ///
    /// `whitespace` records whether a single space follows the token in the
    /// original text.
    pub fn new(text: impl Into<String>, whitespace: bool) -> Self {
        let text = text.into();
        let is_space = !text.is_empty() && text.chars().all(char::is_whitespace);
        let is_punct = !text.is_empty() && text.chars().all(is_punct_char);
        Self {
            text,
            whitespace,
            i: 0,
            idx: 0,
            is_space,
            is_punct,
            is_stop: false,
        }
    }

    /// Mark the token as a stop word.
    #[must_use]
    pub const fn with_stop(mut self, is_stop: bool) -> Self {
        self.is_stop = is_stop;
        self
    }

    /// Override the derived punctuation flag.
    #[must_use]
    pub const fn with_punct(mut self, is_punct: bool) -> Self {
        self.is_punct = is_punct;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether a space follows this token.
    pub const fn whitespace(&self) -> bool {
        self.whitespace
    }

    /// Index of the token within its document.
    pub const fn i(&self) -> usize {
        self.i
    }

    /// Byte offset of the token's first character in the document text.
    pub const fn idx(&self) -> usize {
        self.idx
    }

    /// Byte offset one past the token's last character.
    pub const fn end_idx(&self) -> usize {
        self.idx + self.text.len()
    }

    pub const fn is_space(&self) -> bool {
        self.is_space
    }

    pub const fn is_punct(&self) -> bool {
        self.is_punct
    }

    pub const fn is_stop(&self) -> bool {
        self.is_stop
    }
}

fn is_punct_char(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
    )
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Ordered, read-only sequence of tokens with a derived full text.
#[derive(Debug, Clone)]
pub struct Document {
    tokens: Vec<Token>,
    text: String,
    char_map: OnceLock<CharTokenMap>,
}

impl Document {
    /// Build a document from tokens, assigning positions and offsets.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidDocument`] if any token has empty text.
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> MatchResult<Self> {
        let mut text = String::new();
        let mut placed = Vec::new();

        for (i, mut token) in tokens.into_iter().enumerate() {
            if token.text.is_empty() {
                return Err(MatchError::InvalidDocument {
                    reason: format!("token {i} has empty text"),
                });
            }
            token.i = i;
            token.idx = text.len();
            text.push_str(&token.text);
            if token.whitespace {
                text.push(' ');
            }
            placed.push(token);
        }

        Ok(Self {
            tokens: placed,
            text,
            char_map: OnceLock::new(),
        })
    }

    /// Build a document from parallel word and trailing-space lists.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidDocument`] if the lists differ in length or
    /// a word is empty.
    pub fn from_words<S: AsRef<str>>(words: &[S], spaces: &[bool]) -> MatchResult<Self> {
        if words.len() != spaces.len() {
            return Err(MatchError::InvalidDocument {
                reason: format!(
                    "{} words but {} space flags",
                    words.len(),
                    spaces.len()
                ),
            });
        }
        Self::new(
            words
                .iter()
                .zip(spaces)
                .map(|(word, &space)| Token::new(word.as_ref(), space)),
        )
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Token> {
        self.tokens.get(i)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Full document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Span over tokens `[start, end)`, or `None` if the range is empty or out
    /// of bounds.
    pub fn span(&self, start: usize, end: usize) -> Option<Span<'_>> {
        (start < end && end <= self.len()).then_some(Span {
            doc: self,
            start,
            end,
        })
    }

    /// Text covered by tokens `[start, end)` without the last token's
    /// trailing space. Empty or out-of-bounds ranges yield `""`.
    pub fn span_text(&self, start: usize, end: usize) -> &str {
        if start >= end || end > self.len() {
            return "";
        }
        &self.text[self.tokens[start].idx..self.tokens[end - 1].end_idx()]
    }

    /// Span whose text exactly covers bytes `[start_char, end_char)`, or
    /// `None` if either offset falls inside a token or on whitespace.
    pub fn char_span(&self, start_char: usize, end_char: usize) -> Option<Span<'_>> {
        if start_char >= end_char {
            return None;
        }
        let map = self.char_map();
        let first = map.token_at(start_char)?;
        let last = map.token_at(end_char - 1)?;
        if self.tokens[first].idx != start_char || self.tokens[last].end_idx() != end_char {
            return None;
        }
        self.span(first, last + 1)
    }

    /// Byte-offset to token-index lookup, built on first use and cached.
    pub fn char_map(&self) -> &CharTokenMap {
        self.char_map.get_or_init(|| CharTokenMap::new(self))
    }
}

impl Index<usize> for Document {
    type Output = Token;

    fn index(&self, i: usize) -> &Token {
        &self.tokens[i]
    }
}

// ---------------------------------------------------------------------------
// Span
// ---------------------------------------------------------------------------

/// Borrowed view over tokens `[start, end)` of a document.
#[derive(Debug, Clone, Copy)]
pub struct Span<'d> {
    doc: &'d Document,
    start: usize,
    end: usize,
}

impl<'d> Span<'d> {
    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn end(&self) -> usize {
        self.end
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always `false`: spans cover at least one token.
    pub const fn is_empty(&self) -> bool {
        false
    }

    pub fn text(&self) -> &'d str {
        self.doc.span_text(self.start, self.end)
    }

    pub fn tokens(&self) -> &'d [Token] {
        &self.doc.tokens[self.start..self.end]
    }
}

// ---------------------------------------------------------------------------
// CharTokenMap
// ---------------------------------------------------------------------------

/// Maps every byte of a document's text to the token covering it.
///
/// Bytes of the separating spaces map to nothing.
#[derive(Debug, Clone)]
pub struct CharTokenMap {
    owners: Vec<Option<usize>>,
}

impl CharTokenMap {
    pub fn new(doc: &Document) -> Self {
        let mut owners = vec![None; doc.text.len()];
        for token in &doc.tokens {
            for slot in &mut owners[token.idx..token.end_idx()] {
                *slot = Some(token.i);
            }
        }
        Self { owners }
    }

    /// Index of the token covering byte `offset`, if any.
    pub fn token_at(&self, offset: usize) -> Option<usize> {
        self.owners.get(offset).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant() -> Document {
        Document::from_words(
            &["G", "-", "rant", "Anderson", "lives", "in", "TN", "."],
            &[false, false, true, true, true, true, false, false],
        )
        .expect("valid document")
    }

    #[test]
    fn test_text_is_rebuilt_from_tokens() {
        let doc = grant();
        assert_eq!(doc.text(), "G-rant Anderson lives in TN.");
        assert_eq!(doc.len(), 8);
        assert_eq!(doc[3].idx(), 7);
        assert_eq!(doc[3].i(), 3);
    }

    #[test]
    fn test_span_text_drops_trailing_space() {
        let doc = grant();
        assert_eq!(doc.span_text(0, 4), "G-rant Anderson");
        assert_eq!(doc.span_text(2, 2), "");
        assert_eq!(doc.span_text(7, 9), "");
        assert_eq!(doc.span(3, 5).map(|s| s.text()), Some("Anderson lives"));
    }

    #[test]
    fn test_token_attributes() {
        let doc = grant();
        assert!(doc[1].is_punct());
        assert!(doc[7].is_punct());
        assert!(!doc[2].is_punct());
        assert!(Token::new("\n", false).is_space());
        assert!(Token::new("the", true).with_stop(true).is_stop());
        assert!(!Token::new("-", false).with_punct(false).is_punct());
        assert!(Token::new("§x", false).with_punct(true).is_punct());
    }

    #[test]
    fn test_empty_token_rejected() {
        let err = Document::from_words(&["a", ""], &[true, false])
            .expect_err("should be rejected");
        assert!(matches!(err, MatchError::InvalidDocument { .. }));
    }

    #[test]
    fn test_mismatched_spaces_rejected() {
        let err = Document::from_words(&["a", "b"], &[true])
            .expect_err("should be rejected");
        assert!(matches!(err, MatchError::InvalidDocument { .. }));
    }

    #[test]
    fn test_char_span_requires_token_boundaries() {
        let doc = grant();
        assert_eq!(doc.char_span(0, 6).map(|s| (s.start(), s.end())), Some((0, 3)));
        assert_eq!(doc.char_span(1, 6).map(|s| (s.start(), s.end())), Some((1, 3)));
        assert!(doc.char_span(3, 6).is_none());
        assert!(doc.char_span(0, 7).is_none());
    }

    #[test]
    fn test_char_map_skips_separators() {
        let doc = grant();
        let map = doc.char_map();
        assert_eq!(map.token_at(0), Some(0));
        assert_eq!(map.token_at(2), Some(2));
        assert_eq!(map.token_at(6), None);
        assert_eq!(map.token_at(100), None);
    }
}
