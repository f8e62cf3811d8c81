// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod clean;
pub mod config;
pub mod context;
pub mod corpus;
pub mod lexicon;
pub mod metrics;
pub mod report;
pub mod sentiment;
pub mod services;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::clean::TextCleaner;
pub use crate::config::PipelineConfig;
pub use crate::context::PipelineContext;
pub use crate::corpus::{Corpus, CorpusError, EnrichedRecord, RawComment};
pub use crate::sentiment::{SentimentAnalyzer, SentimentLabel};

use shuttle_axum::axum::Router;

/// Full HTTP app: API routes plus `/metrics`.
pub fn app(state: AppState) -> anyhow::Result<Router> {
    let metrics = crate::metrics::Metrics::global()?;
    Ok(api::router(state).merge(metrics.router()))
}
