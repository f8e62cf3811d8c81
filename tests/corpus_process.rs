// tests/corpus_process.rs
//
// CorpusProcessor contract:
// - missing text dropped, exact duplicates dropped (first occurrence wins)
// - empty-after-clean dropped before scoring
// - output keeps first-occurrence order, not score order
// - a failing service stage degrades the record instead of failing the batch

use std::sync::Arc;

use anyhow::{anyhow, Result};
use komentar_sentiment::clean::TextCleaner;
use komentar_sentiment::corpus::{CorpusProcessor, ProcessingOptions, RawComment};
use komentar_sentiment::lexicon::{NormalizationDictionary, StopwordSet};
use komentar_sentiment::sentiment::{SentimentAnalyzer, SentimentLabel};
use komentar_sentiment::services::{
    IndonesianStemmer, IndonesianStopwordRemover, LanguageServices, Stemmer,
};

fn sequential() -> ProcessingOptions {
    ProcessingOptions {
        parallel: false,
        min_parallel_batch: 64,
    }
}

#[test]
fn dedup_order_and_empty_rows() {
    let dict = NormalizationDictionary::embedded();
    let stop = StopwordSet::embedded();
    let svc = LanguageServices::indonesian(None).unwrap();
    let analyzer = SentimentAnalyzer::embedded();
    let p = CorpusProcessor::new(TextCleaner::new(&dict, &stop, &svc), &analyzer, sequential());

    let raw = vec![
        RawComment::new("ChatGPT bad untuk tugas").with_meta("id", "1"),
        RawComment::missing().with_meta("id", "2"),
        RawComment::new("ChatGPT good banget!!").with_meta("id", "3"),
        RawComment::new("ChatGPT bad untuk tugas").with_meta("id", "4"),
        RawComment::new("@budi 12345 #wkwk").with_meta("id", "5"),
        RawComment::new("mahasiswa belajar").with_meta("id", "6"),
    ];
    let out = p.process(&raw);

    let ids: Vec<&str> = out.records.iter().map(|r| r.metadata["id"].as_str()).collect();
    assert_eq!(ids, ["1", "3", "6"], "first-occurrence order, duplicate #4 dropped");

    assert_eq!(out.stats.input, 6);
    assert_eq!(out.stats.missing_text, 1);
    assert_eq!(out.stats.duplicates, 1);
    assert_eq!(out.stats.empty_after_clean, 1);
    assert_eq!(out.stats.kept, 3);

    assert_eq!(out.records[0].original_text, "ChatGPT bad untuk tugas");
    assert_eq!(out.records[0].sentiment_label, SentimentLabel::Negative);
    assert_eq!(out.records[1].sentiment_label, SentimentLabel::Positive);
    assert_eq!(out.records[2].clean_text, "mahasiswa ajar");
    assert_eq!(out.records[2].sentiment_score, 0.0);
    assert_eq!(out.records[2].sentiment_label, SentimentLabel::Neutral);
    assert!(out.records.iter().all(|r| !r.clean_text.is_empty()));
}

#[test]
fn duplicates_are_by_exact_original_text() {
    let dict = NormalizationDictionary::embedded();
    let stop = StopwordSet::embedded();
    let svc = LanguageServices::indonesian(None).unwrap();
    let analyzer = SentimentAnalyzer::embedded();
    let p = CorpusProcessor::new(TextCleaner::new(&dict, &stop, &svc), &analyzer, sequential());

    // Same cleaned text, different originals: both are kept.
    let out = p.process(&[
        RawComment::new("Bagus!"),
        RawComment::new("bagus"),
        RawComment::new("Bagus!"),
    ]);
    assert_eq!(out.records.len(), 2);
    assert_eq!(out.stats.duplicates, 1);
    assert_eq!(out.records[0].clean_text, out.records[1].clean_text);
}

struct FlakyStemmer {
    inner: IndonesianStemmer,
}

impl Stemmer for FlakyStemmer {
    fn stem(&self, text: &str) -> Result<String> {
        if text.contains("rusak") {
            return Err(anyhow!("unexpected token"));
        }
        self.inner.stem(text)
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

#[test]
fn failing_stage_drops_only_that_record() {
    let dict = NormalizationDictionary::embedded();
    let stop = StopwordSet::embedded();
    let svc = LanguageServices::new(
        Arc::new(IndonesianStopwordRemover::new()),
        Arc::new(FlakyStemmer {
            inner: IndonesianStemmer::embedded(),
        }),
    );
    let analyzer = SentimentAnalyzer::embedded();

    for options in [
        sequential(),
        ProcessingOptions {
            parallel: true,
            min_parallel_batch: 1,
        },
    ] {
        let p = CorpusProcessor::new(TextCleaner::new(&dict, &stop, &svc), &analyzer, options);
        let out = p.process(&[
            RawComment::new("sangat membantu"),
            RawComment::new("aplikasi rusak terus"),
            RawComment::new("good job"),
        ]);
        let texts: Vec<&str> = out.records.iter().map(|r| r.clean_text.as_str()).collect();
        assert_eq!(texts, ["bantu", "good job"]);
        assert_eq!(out.stats.empty_after_clean, 1);
    }
}

#[test]
fn empty_batch_is_fine() {
    let dict = NormalizationDictionary::default();
    let stop = StopwordSet::default();
    let svc = LanguageServices::indonesian(None).unwrap();
    let analyzer = SentimentAnalyzer::embedded();
    let p = CorpusProcessor::new(TextCleaner::new(&dict, &stop, &svc), &analyzer, sequential());
    let out = p.process(&[]);
    assert!(out.records.is_empty());
    assert_eq!(out.stats.kept, 0);
}
