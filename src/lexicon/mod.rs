// src/lexicon/mod.rs
//! Static language data: slang normalization dictionary and the manual stopword set.
//!
//! Both are embedded at build time from `data/` and can be replaced by a file path from
//! configuration. A broken override never aborts startup; the embedded data is used instead.

pub mod slang;
pub mod stopwords;

pub use slang::NormalizationDictionary;
pub use stopwords::StopwordSet;

/// Parse a one-word-per-line list: trims, lowercases, skips blanks and `#` comments.
pub(crate) fn parse_word_lines(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_lowercase)
}
