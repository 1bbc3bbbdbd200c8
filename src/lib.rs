//! `fuzzy-span`: fuzzy and regex span matching over tokenized documents.
//!
//! Given a tokenized document and a tokenized query, [`FuzzySearcher`] finds
//! the span(s) of the document whose text most resembles the query, even
//! with spelling variation or OCR noise. [`RegexSearcher`] runs a
//! character-level regex over the document text and maps every hit back
//! onto token boundaries.
//!
//! Tokenization is left to the caller: build a [`Document`] from tokens that
//! already carry their text, trailing whitespace and lexical flags.
//!
//! # Modules
//!
//! - `doc`: tokens, documents, spans and the byte-to-token map
//! - `fuzz`: scan/optimize/trim search, similarity scorers, trim rules
//! - `regex_search`: regex engines, the predefined pattern library and
//!   token alignment
//! - `advisory`: non-fatal warnings returned beside results
//!
//! # Pipeline
//!
//! ```text
//! query ─┐
//!        ├→ scan (min_r1) → select → optimize (flex) → trim → accept (min_r2)
//! doc ───┘                                                        ↓
//!                                         multi: sort → filter overlapping
//! ```
//!
//! # Example
//!
//! ```
//! use fuzzy_span::{Document, FuzzySearcher, SearchOptions};
//!
//! let doc = Document::from_words(
//!     &["G", "-", "rant", "Anderson", "lives", "in", "TN", "."],
//!     &[false, false, true, true, true, true, false, false],
//! )?;
//! let query = Document::from_words(&["Grant", "Andersen"], &[true, false])?;
//!
//! let searcher = FuzzySearcher::new();
//! let best = searcher
//!     .best_match(&doc, &query, &SearchOptions::for_best_match())?
//!     .into_value();
//! assert_eq!(best.map(|m| (m.start, m.end, m.ratio)), Some((0, 4, 90)));
//! # Ok::<(), fuzzy_span::MatchError>(())
//! ```

pub mod advisory;
pub mod doc;
pub mod error;
pub mod fuzz;
pub mod regex_search;

pub use advisory::{Advisory, Outcome};
pub use doc::{CharTokenMap, Document, Span, Token};
pub use error::{MatchError, MatchResult};
pub use fuzz::{Algorithm, Flex, FuzzyConfig, FuzzySearcher, Match, SearchOptions, TrimRule};
pub use regex_search::{FuzzyCounts, RegexConfig, RegexMatch, RegexSearcher};
