// src/lexicon/stopwords.rs
//! Manual stopword set, applied after the stopword-removal service.

use anyhow::{Context, Result};
use std::{collections::HashSet, fs, path::Path};
use tracing::warn;

use super::parse_word_lines;

const EMBEDDED_STOPWORDS: &str = include_str!("../../data/stopwords.txt");

#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn embedded() -> Self {
        Self::from_lines(EMBEDDED_STOPWORDS)
    }

    pub fn from_lines(raw: &str) -> Self {
        Self {
            words: parse_word_lines(raw).collect(),
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading stopwords from {}", path.display()))?;
        Ok(Self::from_lines(&raw))
    }

    pub fn load_or_embedded(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!(
                    target: "lexicon",
                    error = %format!("{e:#}"),
                    "stopword override unusable, using embedded"
                );
                Self::embedded()
            }),
            None => Self::embedded(),
        }
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    /// Drop every whitespace token found in the set; rejoin with single spaces.
    pub fn remove_from(&self, text: &str) -> String {
        text.split_whitespace()
            .filter(|t| !self.contains(t))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
