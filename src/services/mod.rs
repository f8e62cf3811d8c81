// src/services/mod.rs
//! Pluggable language services used by the cleaner.
//!
//! The cleaner only sees two narrow capabilities: stopword removal and stemming. Both take
//! and return whole strings so a backend may match multi-token phrases or reorder nothing
//! at all. Implementations are immutable after construction and shared across workers.

pub mod stemmer;
pub mod stopword;

use anyhow::Result;
use std::{fmt, path::Path, sync::Arc};

pub use stemmer::IndonesianStemmer;
pub use stopword::IndonesianStopwordRemover;

pub trait StopwordRemover: Send + Sync {
    fn remove_stopwords(&self, text: &str) -> Result<String>;
    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;
}

pub trait Stemmer: Send + Sync {
    fn stem(&self, text: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// The pair of services the cleaner runs in stages 5 and 7.
#[derive(Clone)]
pub struct LanguageServices {
    pub stopwords: Arc<dyn StopwordRemover>,
    pub stemmer: Arc<dyn Stemmer>,
}

impl LanguageServices {
    pub fn new(stopwords: Arc<dyn StopwordRemover>, stemmer: Arc<dyn Stemmer>) -> Self {
        Self { stopwords, stemmer }
    }

    /// Default Indonesian backends. Building the stemmer indexes the root-word dictionary,
    /// which is the costly part; callers keep one instance per process.
    pub fn indonesian(root_words: Option<&Path>) -> Result<Self> {
        let stemmer = match root_words {
            Some(p) => IndonesianStemmer::load_from_file(p)?,
            None => IndonesianStemmer::embedded(),
        };
        Ok(Self::new(
            Arc::new(IndonesianStopwordRemover::new()),
            Arc::new(stemmer),
        ))
    }
}

impl fmt::Debug for LanguageServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageServices")
            .field("stopwords", &self.stopwords.name())
            .field("stemmer", &self.stemmer.name())
            .finish()
    }
}
