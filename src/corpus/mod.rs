// src/corpus/mod.rs
//! Corpus loading, processing and memoization.
//!
//! `source` reads the tabular input, `processor` turns raw comments into enriched records,
//! `cache` keeps the single most recent result keyed by the source fingerprint.

pub mod cache;
pub mod processor;
pub mod source;

use chrono::{DateTime, Utc};
use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, io, path::PathBuf};

use crate::sentiment::SentimentLabel;

pub use cache::{CorpusCache, FileStat, SourceFingerprint};
pub use processor::{CorpusProcessor, ProcessOutcome, ProcessStats, ProcessingOptions};
pub use source::{ColumnNames, SourceMode, SourceRows, SourceSpec};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("corpus_rows_total", "Comments handed to the processor.");
        describe_counter!(
            "corpus_rows_skipped_total",
            "Source rows skipped as malformed or incomplete."
        );
        describe_counter!(
            "corpus_duplicates_total",
            "Comments dropped as exact duplicates of an earlier one."
        );
        describe_counter!(
            "corpus_empty_after_clean_total",
            "Comments dropped because cleaning left nothing."
        );
        describe_counter!("corpus_kept_total", "Enriched records produced.");
        describe_counter!(
            "clean_stage_errors_total",
            "Service stage failures degraded to empty text."
        );
        describe_counter!("corpus_cache_hits_total", "Corpus loads served from cache.");
        describe_counter!(
            "corpus_cache_misses_total",
            "Corpus loads that ran the pipeline."
        );
        describe_histogram!("corpus_process_ms", "Corpus processing time in milliseconds.");
    });
}

/// One ingested row. `text` is `None` when the cell is missing or blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawComment {
    pub text: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl RawComment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            metadata: BTreeMap::new(),
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The unit of output: original text, cleaned text, score, label and passthrough columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub original_text: String,
    pub clean_text: String,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    #[serde(flatten)]
    pub metadata: BTreeMap<String, String>,
}

/// A fully loaded corpus, shared behind `Arc` once built.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub source: SourceSpec,
    pub records: Vec<EnrichedRecord>,
    pub stats: ProcessStats,
    pub skipped_rows: usize,
    /// Source fingerprint at build time. A later touched-but-unchanged reuse does not update
    /// it; `CorpusCache::fingerprint` has the current stat.
    pub fingerprint: SourceFingerprint,
    pub loaded_at: DateTime<Utc>,
}

impl Corpus {
    pub fn mode(&self) -> SourceMode {
        self.source.mode
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fatal load failures. Row-level problems never end up here.
#[derive(Debug)]
pub enum CorpusError {
    Io { path: PathBuf, source: io::Error },
    Csv { path: PathBuf, source: csv::Error },
    MissingColumn { path: PathBuf, column: String },
    InvalidDelimiter(String),
    Services(anyhow::Error),
}

impl fmt::Display for CorpusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusError::Io { path, source } => {
                write!(f, "cannot read corpus source {}: {source}", path.display())
            }
            CorpusError::Csv { path, source } => {
                write!(f, "corpus source {} is not valid delimited text: {source}", path.display())
            }
            CorpusError::MissingColumn { path, column } => {
                write!(f, "corpus source {} has no `{column}` column", path.display())
            }
            CorpusError::InvalidDelimiter(d) => {
                write!(f, "delimiter must be a single ASCII byte, got {d:?}")
            }
            CorpusError::Services(e) => write!(f, "language services unavailable: {e:#}"),
        }
    }
}

impl std::error::Error for CorpusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CorpusError::Io { source, .. } => Some(source),
            CorpusError::Csv { source, .. } => Some(source),
            CorpusError::Services(e) => Some(&**e),
            CorpusError::MissingColumn { .. } | CorpusError::InvalidDelimiter(_) => None,
        }
    }
}
