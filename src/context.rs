// src/context.rs
//! Process-wide pipeline context.
//!
//! Owns the static language data, the sentiment analyzer, the lazily built language
//! services and the corpus cache. Handed around as `Arc<PipelineContext>`.

use anyhow::Result;
use metrics::counter;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::{
    fmt, fs,
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};
use tracing::{info, warn};

use crate::clean::TextCleaner;
use crate::config::PipelineConfig;
use crate::corpus::{
    ensure_metrics_described, source, Corpus, CorpusCache, CorpusError, CorpusProcessor,
    FileStat, ProcessStats, ProcessingOptions, SourceFingerprint, SourceRows, SourceSpec,
};
use crate::lexicon::{NormalizationDictionary, StopwordSet};
use crate::sentiment::{SentimentAnalyzer, SentimentLabel};
use crate::services::LanguageServices;

pub type ServiceFactory = Box<dyn Fn() -> Result<LanguageServices> + Send + Sync>;

/// Result of analyzing a single comment outside any corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub clean_text: String,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
}

pub struct PipelineContext {
    dictionary: NormalizationDictionary,
    stopwords: StopwordSet,
    analyzer: SentimentAnalyzer,
    services: OnceCell<LanguageServices>,
    factory: ServiceFactory,
    options: ProcessingOptions,
    cache_enabled: bool,
    cache: CorpusCache,
    load_lock: Mutex<()>,
}

impl fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineContext")
            .field("slang_rules", &self.dictionary.len())
            .field("stopwords", &self.stopwords.len())
            .field("lexicon", &self.analyzer.lexicon_len())
            .field("services", &self.services.get())
            .field("options", &self.options)
            .field("cache_enabled", &self.cache_enabled)
            .finish()
    }
}

impl PipelineContext {
    /// Load language data (overrides fall back to embedded data) and register the default
    /// Indonesian service factory. Services themselves are built on first use.
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        let lex = &cfg.lexicon;
        let root_words = lex.root_words.clone();
        Self {
            dictionary: NormalizationDictionary::load_or_embedded(lex.slang.as_deref()),
            stopwords: StopwordSet::load_or_embedded(lex.stopwords.as_deref()),
            analyzer: SentimentAnalyzer::load_or_embedded(lex.sentiment.as_deref()),
            services: OnceCell::new(),
            factory: Box::new(move || LanguageServices::indonesian(root_words.as_deref())),
            options: cfg.processing,
            cache_enabled: cfg.cache.enabled,
            cache: CorpusCache::new(),
            load_lock: Mutex::new(()),
        }
    }

    /// Swap the service backends. Takes effect because services are not built yet.
    pub fn with_service_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<LanguageServices> + Send + Sync + 'static,
    {
        self.factory = Box::new(factory);
        self.services = OnceCell::new();
        self
    }

    pub fn with_dictionary(mut self, dictionary: NormalizationDictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn with_stopwords(mut self, stopwords: StopwordSet) -> Self {
        self.stopwords = stopwords;
        self
    }

    /// Language services, built exactly once. Concurrent first callers block on the one
    /// initialization; a failed build is returned and the next call tries again.
    pub fn services(&self) -> Result<&LanguageServices> {
        self.services.get_or_try_init(|| {
            let started = Instant::now();
            let svc = (self.factory)()?;
            info!(
                target: "context",
                stopwords = svc.stopwords.name(),
                stemmer = svc.stemmer.name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "language services ready"
            );
            Ok(svc)
        })
    }

    pub fn cleaner(&self) -> Result<TextCleaner<'_>> {
        Ok(TextCleaner::new(
            &self.dictionary,
            &self.stopwords,
            self.services()?,
        ))
    }

    pub fn processor(&self) -> Result<CorpusProcessor<'_>> {
        Ok(CorpusProcessor::new(
            self.cleaner()?,
            &self.analyzer,
            self.options,
        ))
    }

    pub fn analyzer(&self) -> &SentimentAnalyzer {
        &self.analyzer
    }

    pub fn cache(&self) -> &CorpusCache {
        &self.cache
    }

    /// Clean, score and label one comment. A failing service stage degrades to an empty
    /// clean text (`Netral`, 0.0); only a services build failure is an error.
    pub fn analyze_text(&self, text: Option<&str>) -> Result<Analysis, CorpusError> {
        let cleaner = self.cleaner().map_err(CorpusError::Services)?;
        let clean_text = cleaner.clean(text);
        let (sentiment_score, sentiment_label) = self.analyzer.analyze(&clean_text);
        Ok(Analysis {
            clean_text,
            sentiment_score,
            sentiment_label,
        })
    }

    /// Load (or reuse) the corpus described by `spec`.
    ///
    /// Blocking: reads the file and may run the whole pipeline. Call from
    /// `spawn_blocking` in async code.
    pub fn load_corpus(&self, spec: &SourceSpec) -> Result<Arc<Corpus>, CorpusError> {
        ensure_metrics_described();
        self.load_corpus_inner(spec).inspect_err(|e| {
            warn!(target: "corpus", path = %spec.path.display(), error = %e, "corpus load failed");
        })
    }

    fn load_corpus_inner(&self, spec: &SourceSpec) -> Result<Arc<Corpus>, CorpusError> {
        let io_err = |source| CorpusError::Io {
            path: spec.path.clone(),
            source,
        };

        if self.cache_enabled {
            let stat = FileStat::of(&spec.path).map_err(io_err)?;
            if let Some(hit) = self.cache.lookup_stat(spec, stat) {
                counter!("corpus_cache_hits_total").increment(1);
                return Ok(hit);
            }
        }

        // guards `()`; a panic in an earlier load leaves nothing half-written
        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let stat = FileStat::of(&spec.path).map_err(io_err)?;
        // double-check: another caller may have loaded it while we waited
        if self.cache_enabled {
            if let Some(hit) = self.cache.lookup_stat(spec, stat) {
                counter!("corpus_cache_hits_total").increment(1);
                return Ok(hit);
            }
        }

        let bytes = fs::read(&spec.path).map_err(io_err)?;
        let fingerprint = SourceFingerprint::compute(&spec.path, stat, &bytes);
        if self.cache_enabled {
            if let Some(hit) = self.cache.lookup_content(spec, &fingerprint) {
                counter!("corpus_cache_hits_total").increment(1);
                info!(
                    target: "corpus",
                    path = %spec.path.display(),
                    "source touched but unchanged; reusing corpus"
                );
                return Ok(hit);
            }
        }
        counter!("corpus_cache_misses_total").increment(1);

        let rows = source::read_rows(&bytes[..], spec)?;
        let skipped_rows = rows.skipped();
        counter!("corpus_rows_skipped_total").increment(skipped_rows as u64);
        if skipped_rows > 0 {
            warn!(
                target: "corpus",
                path = %spec.path.display(),
                skipped_rows,
                "malformed rows skipped"
            );
        }

        let (records, stats) = match rows {
            SourceRows::Raw { comments, .. } => {
                let processor = self.processor().map_err(CorpusError::Services)?;
                let outcome = processor.process(&comments);
                (outcome.records, outcome.stats)
            }
            SourceRows::Precomputed { records, .. } => {
                let stats = ProcessStats {
                    input: records.len(),
                    kept: records.len(),
                    ..ProcessStats::default()
                };
                (records, stats)
            }
        };

        let corpus = Arc::new(Corpus {
            source: spec.clone(),
            records,
            stats,
            skipped_rows,
            fingerprint,
            loaded_at: chrono::Utc::now(),
        });
        info!(
            target: "corpus",
            path = %spec.path.display(),
            mode = %spec.mode,
            records = corpus.len(),
            skipped_rows,
            "corpus loaded"
        );

        if self.cache_enabled {
            self.cache.store(spec, Arc::clone(&corpus));
        }
        Ok(corpus)
    }
}
