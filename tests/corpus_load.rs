// tests/corpus_load.rs
//
// PipelineContext::load_corpus against real files:
// - raw and precomputed modes
// - malformed rows skipped, missing file / column fatal
// - memoization: unchanged source is a cache hit, edited source is reprocessed
// - a panicking service backend does not wedge later loads

use std::{
    fs,
    panic::{self, AssertUnwindSafe},
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use komentar_sentiment::config::PipelineConfig;
use komentar_sentiment::context::PipelineContext;
use komentar_sentiment::corpus::{CorpusError, SourceMode, SourceSpec};
use komentar_sentiment::sentiment::SentimentLabel;
use komentar_sentiment::services::{IndonesianStopwordRemover, LanguageServices, Stemmer};

fn ctx() -> PipelineContext {
    PipelineContext::from_config(&PipelineConfig::default())
}

fn write(path: &Path, body: &str) {
    fs::write(path, body).expect("write csv");
}

#[test]
fn raw_source_is_processed_and_cached() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("comments.csv");
    write(
        &path,
        "Comment,author\n\
         \"ChatGPT good, sangat membantu pekerjaan\",a\n\
         \"ChatGPT bad, bikin malas\",b\n\
         broken,row,with,too,many\n\
         \"ChatGPT good, sangat membantu pekerjaan\",c\n\
         ,d\n",
    );
    let spec = SourceSpec::new(&path, SourceMode::Raw);
    let ctx = ctx();

    let first = ctx.load_corpus(&spec).unwrap();
    assert_eq!(first.mode(), SourceMode::Raw);
    assert_eq!(first.skipped_rows, 1);
    assert_eq!(first.stats.input, 4);
    assert_eq!(first.stats.duplicates, 1);
    assert_eq!(first.stats.missing_text, 1);
    assert_eq!(first.len(), 2);
    assert_eq!(first.records[0].clean_text, "chatgpt good bantu kerja");
    assert_eq!(first.records[0].metadata["author"], "a");
    assert_eq!(first.records[1].sentiment_label, SentimentLabel::Negative);

    let second = ctx.load_corpus(&spec).unwrap();
    assert!(Arc::ptr_eq(&first, &second), "unchanged source must be a cache hit");
}

#[test]
fn edited_source_is_reprocessed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("comments.csv");
    write(&path, "Comment\ngood\n");
    let spec = SourceSpec::new(&path, SourceMode::Raw);
    let ctx = ctx();

    let first = ctx.load_corpus(&spec).unwrap();
    assert_eq!(first.len(), 1);

    // different length, so the change is visible even with coarse mtimes
    write(&path, "Comment\ngood\nbad idea\n");
    let second = ctx.load_corpus(&spec).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.len(), 2);
    assert_ne!(first.fingerprint.sha256, second.fingerprint.sha256);
}

#[test]
fn rewritten_with_same_bytes_reuses_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("comments.csv");
    let body = "Comment\nsangat membantu\n";
    write(&path, body);
    let spec = SourceSpec::new(&path, SourceMode::Raw);
    let ctx = ctx();

    let first = ctx.load_corpus(&spec).unwrap();
    write(&path, body);
    let second = ctx.load_corpus(&spec).unwrap();
    assert!(Arc::ptr_eq(&first, &second), "same content must not rerun the pipeline");
}

#[test]
fn cache_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("comments.csv");
    write(&path, "Comment\ngood\n");
    let mut cfg = PipelineConfig::default();
    cfg.cache.enabled = false;
    let ctx = PipelineContext::from_config(&cfg);
    let spec = SourceSpec::new(&path, SourceMode::Raw);

    let a = ctx.load_corpus(&spec).unwrap();
    let b = ctx.load_corpus(&spec).unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a.records, b.records);
}

#[test]
fn precomputed_source_bypasses_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scored.csv");
    write(
        &path,
        "Comment,clean_comment,sentiment_score,sentiment_label\n\
         Keren!,keren,0.6,Positif\n\
         Yg gak jelas,,0.0,Netral\n\
         Parah,parah,-0.7,Negatif\n",
    );
    let spec = SourceSpec::new(&path, SourceMode::Precomputed);
    let corpus = ctx().load_corpus(&spec).unwrap();
    assert_eq!(corpus.mode(), SourceMode::Precomputed);
    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus.skipped_rows, 1);
    // passed through unchanged, not re-cleaned or re-scored
    assert_eq!(corpus.records[0].clean_text, "keren");
    assert_eq!(corpus.records[0].sentiment_score, 0.6);
    assert_eq!(corpus.records[1].sentiment_label, SentimentLabel::Negative);
}

#[test]
fn missing_file_is_fatal_and_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.csv");
    let err = ctx()
        .load_corpus(&SourceSpec::new(&path, SourceMode::Raw))
        .unwrap_err();
    assert!(matches!(err, CorpusError::Io { .. }));
    assert!(err.to_string().contains("nope.csv"), "{err}");
}

#[test]
fn missing_text_column_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wrong.csv");
    write(&path, "komentar\nbagus\n");
    let err = ctx()
        .load_corpus(&SourceSpec::new(&path, SourceMode::Raw))
        .unwrap_err();
    assert!(matches!(err, CorpusError::MissingColumn { .. }));
}

#[test]
fn all_rows_filtered_is_an_empty_corpus_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noise.csv");
    write(&path, "Comment\n@budi\n#wkwk 123\nhttps://t.co/x\n");
    let corpus = ctx()
        .load_corpus(&SourceSpec::new(&path, SourceMode::Raw))
        .unwrap();
    assert!(corpus.is_empty());
    assert_eq!(corpus.stats.empty_after_clean, 3);
}

/// Panics on its first call, then passes text through.
#[derive(Default)]
struct PanicOnce {
    fired: AtomicBool,
}

impl Stemmer for PanicOnce {
    fn stem(&self, text: &str) -> anyhow::Result<String> {
        if !self.fired.swap(true, Ordering::SeqCst) {
            panic!("stemmer backend crashed");
        }
        Ok(text.to_string())
    }
    fn name(&self) -> &'static str {
        "panic-once"
    }
}

#[test]
fn load_recovers_after_a_panicking_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("comments.csv");
    write(&path, "Comment
good
bad
");
    let spec = SourceSpec::new(&path, SourceMode::Raw);
    let stemmer = Arc::new(PanicOnce::default());
    let ctx = ctx().with_service_factory(move || {
        Ok(LanguageServices::new(
            Arc::new(IndonesianStopwordRemover::new()),
            stemmer.clone(),
        ))
    });

    let first = panic::catch_unwind(AssertUnwindSafe(|| ctx.load_corpus(&spec)));
    assert!(first.is_err(), "first load should propagate the backend panic");

    let second = ctx.load_corpus(&spec).expect("later loads still work");
    assert_eq!(second.len(), 2);
    assert_eq!(second.records[0].clean_text, "good");
}
