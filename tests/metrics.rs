// tests/metrics.rs
//
// /metrics is merged into the full app and exposes the corpus pipeline series once a
// corpus has been processed.

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use komentar_sentiment::config::PipelineConfig;
use komentar_sentiment::corpus::{SourceMode, SourceSpec};
use komentar_sentiment::{app, AppState};

async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn metrics_endpoint_contains_pipeline_series() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("comments.csv");
    std::fs::write(&path, "Comment\ngood\ngood\n@budi\nbad,extra\n").unwrap();

    let mut cfg = PipelineConfig::default();
    cfg.source = SourceSpec::new(&path, SourceMode::Raw);
    let app = app(AppState::from_config(&cfg)).expect("app builds");

    let (status, _) = get_text(app.clone(), "/records").await;
    assert_eq!(status, StatusCode::OK);
    // second load is served from cache
    let (status, _) = get_text(app.clone(), "/summary").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_text(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    for series in [
        "corpus_rows_total",
        "corpus_duplicates_total",
        "corpus_empty_after_clean_total",
        "corpus_kept_total",
        "corpus_rows_skipped_total",
        "corpus_cache_misses_total",
        "corpus_cache_hits_total",
        "corpus_process_ms",
    ] {
        assert!(body.contains(series), "missing {series} in:\n{body}");
    }
}

#[tokio::test]
async fn app_can_be_built_twice_in_one_process() {
    let cfg = PipelineConfig::default();
    assert!(app(AppState::from_config(&cfg)).is_ok());
    assert!(app(AppState::from_config(&cfg)).is_ok());
}
