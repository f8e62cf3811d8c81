// src/corpus/processor.rs
//! Raw comments -> enriched records.
//!
//! Order of operations:
//! 1) drop rows without text
//! 2) dedup by exact original text (first occurrence wins)
//! 3) clean (parallel when the batch is big enough)
//! 4) drop rows whose cleaned text is empty
//! 5) score + label
//!
//! Output order is the first-occurrence order of the input.

use metrics::{counter, histogram};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, time::Instant};
use tracing::{debug, info};

use super::{ensure_metrics_described, EnrichedRecord, RawComment};
use crate::clean::TextCleaner;
use crate::sentiment::{SentimentAnalyzer, SentimentLabel};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ProcessingOptions {
    /// Use the rayon pool for cleaning and scoring.
    pub parallel: bool,
    /// Smaller batches run sequentially even when `parallel` is set.
    pub min_parallel_batch: usize,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            min_parallel_batch: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessStats {
    pub input: usize,
    pub missing_text: usize,
    pub duplicates: usize,
    pub empty_after_clean: usize,
    pub kept: usize,
}

#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub records: Vec<EnrichedRecord>,
    pub stats: ProcessStats,
}

pub struct CorpusProcessor<'a> {
    cleaner: TextCleaner<'a>,
    analyzer: &'a SentimentAnalyzer,
    options: ProcessingOptions,
}

impl<'a> CorpusProcessor<'a> {
    pub fn new(
        cleaner: TextCleaner<'a>,
        analyzer: &'a SentimentAnalyzer,
        options: ProcessingOptions,
    ) -> Self {
        Self {
            cleaner,
            analyzer,
            options,
        }
    }

    pub fn process(&self, raw: &[RawComment]) -> ProcessOutcome {
        ensure_metrics_described();
        let started = Instant::now();

        let mut stats = ProcessStats {
            input: raw.len(),
            ..ProcessStats::default()
        };

        // 1) + 2)
        let mut seen: HashSet<&str> = HashSet::with_capacity(raw.len());
        let mut unique: Vec<(&str, &RawComment)> = Vec::with_capacity(raw.len());
        for rc in raw {
            let Some(text) = rc.text.as_deref() else {
                stats.missing_text += 1;
                continue;
            };
            if seen.insert(text) {
                unique.push((text, rc));
            } else {
                stats.duplicates += 1;
            }
        }

        // 3) + 5); empty cleaned text is never scored
        let clean_and_score = |text: &str| -> Option<(String, f64)> {
            let clean = self.cleaner.clean(Some(text));
            if clean.is_empty() {
                None
            } else {
                let score = self.analyzer.score(&clean);
                Some((clean, score))
            }
        };
        let parallel = self.options.parallel && unique.len() >= self.options.min_parallel_batch;
        let scored: Vec<Option<(String, f64)>> = if parallel {
            unique.par_iter().map(|(t, _)| clean_and_score(t)).collect()
        } else {
            unique.iter().map(|(t, _)| clean_and_score(t)).collect()
        };

        // 4)
        let mut records = Vec::with_capacity(scored.len());
        for ((text, rc), result) in unique.into_iter().zip(scored) {
            match result {
                Some((clean_text, score)) => records.push(EnrichedRecord {
                    original_text: text.to_string(),
                    clean_text,
                    sentiment_score: score,
                    sentiment_label: SentimentLabel::from_score(score),
                    metadata: rc.metadata.clone(),
                }),
                None => stats.empty_after_clean += 1,
            }
        }
        stats.kept = records.len();

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        counter!("corpus_rows_total").increment(stats.input as u64);
        counter!("corpus_duplicates_total").increment(stats.duplicates as u64);
        counter!("corpus_empty_after_clean_total").increment(stats.empty_after_clean as u64);
        counter!("corpus_kept_total").increment(stats.kept as u64);
        histogram!("corpus_process_ms").record(elapsed_ms);

        debug!(target: "corpus", parallel, batch = stats.input, "processor mode");
        info!(
            target: "corpus",
            input = stats.input,
            missing_text = stats.missing_text,
            duplicates = stats.duplicates,
            empty_after_clean = stats.empty_after_clean,
            kept = stats.kept,
            elapsed_ms = elapsed_ms as u64,
            "corpus processed"
        );

        ProcessOutcome { records, stats }
    }
}
