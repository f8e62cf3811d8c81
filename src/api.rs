// src/api.rs
//! HTTP read interface over the enriched corpus.
//!
//! GET  /health
//! GET  /records?labels=Positif,Negatif&limit=N
//! GET  /summary?labels=...
//! GET  /words?labels=...&top=N
//! GET  /words/by-label?top=N
//! GET  /histogram?labels=...&bins=N
//! POST /analyze {"text": "..."}

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use shuttle_axum::axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::context::{Analysis, PipelineContext};
use crate::corpus::{Corpus, CorpusError, EnrichedRecord, ProcessStats, SourceMode, SourceSpec};
use crate::report::{
    self, LabelFilter, LabelWords, Summary, WordCount, DEFAULT_HISTOGRAM_BINS, DEFAULT_TOP_WORDS,
};

const MAX_BINS: usize = 200;
const MAX_TOP: usize = 100;

#[derive(Clone)]
pub struct AppState {
    ctx: Arc<PipelineContext>,
    source: Arc<SourceSpec>,
}

impl AppState {
    pub fn new(ctx: Arc<PipelineContext>, source: SourceSpec) -> Self {
        Self {
            ctx,
            source: Arc::new(source),
        }
    }

    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self::new(
            Arc::new(PipelineContext::from_config(cfg)),
            cfg.source.clone(),
        )
    }

    pub fn context(&self) -> &Arc<PipelineContext> {
        &self.ctx
    }

    pub fn source(&self) -> &SourceSpec {
        &self.source
    }

    /// Build services and load the corpus ahead of the first request. Blocking.
    pub fn warm_up(&self) -> Result<Arc<Corpus>, CorpusError> {
        self.ctx.load_corpus(&self.source)
    }

    async fn corpus(&self) -> Result<Arc<Corpus>, ApiError> {
        let ctx = Arc::clone(&self.ctx);
        let spec = Arc::clone(&self.source);
        tokio::task::spawn_blocking(move || ctx.load_corpus(&spec))
            .await
            .map_err(|e| ApiError::Internal(format!("corpus load task failed: {e}")))?
            .map_err(ApiError::Unavailable)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/records", get(records))
        .route("/summary", get(summary))
        .route("/words", get(words))
        .route("/words/by-label", get(words_by_label))
        .route("/histogram", get(histogram))
        .route("/analyze", post(analyze))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    Unavailable(CorpusError),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unavailable(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "data unavailable", "detail": e.to_string() })),
            )
                .into_response(),
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "bad request", "detail": detail })),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                error!(target: "api", %detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal error", "detail": detail })),
                )
                    .into_response()
            }
        }
    }
}

fn parse_labels(raw: Option<&str>) -> Result<LabelFilter, ApiError> {
    LabelFilter::parse(raw.unwrap_or_default()).map_err(|e| ApiError::BadRequest(e.to_string()))
}

#[derive(Debug, Default, Deserialize)]
struct FilterQuery {
    labels: Option<String>,
    limit: Option<usize>,
    top: Option<usize>,
    bins: Option<usize>,
}

#[derive(Serialize)]
struct RecordsResp<'a> {
    total: usize,
    returned: usize,
    no_data: bool,
    records: Vec<&'a EnrichedRecord>,
}

async fn records(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let filter = parse_labels(q.labels.as_deref())?;
    let corpus = state.corpus().await?;
    let filtered = report::filter_by_labels(&corpus.records, &filter);
    let total = filtered.len();
    let records: Vec<&EnrichedRecord> = match q.limit {
        Some(n) => filtered.into_iter().take(n).collect(),
        None => filtered,
    };
    Ok(Json(RecordsResp {
        total,
        returned: records.len(),
        no_data: total == 0,
        records,
    })
    .into_response())
}

#[derive(Serialize)]
struct SummaryResp {
    #[serde(flatten)]
    summary: Summary,
    mode: SourceMode,
    skipped_rows: usize,
    stats: ProcessStats,
    loaded_at: String,
}

async fn summary(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let filter = parse_labels(q.labels.as_deref())?;
    let corpus = state.corpus().await?;
    let filtered = report::filter_by_labels(&corpus.records, &filter);
    let summary = Summary::from_records(&filtered, corpus.len());
    Ok(Json(SummaryResp {
        summary,
        mode: corpus.mode(),
        skipped_rows: corpus.skipped_rows,
        stats: corpus.stats,
        loaded_at: corpus.loaded_at.to_rfc3339(),
    })
    .into_response())
}

#[derive(Serialize)]
struct WordsResp {
    no_data: bool,
    words: Vec<WordCount>,
}

async fn words(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let filter = parse_labels(q.labels.as_deref())?;
    let top = q.top.unwrap_or(DEFAULT_TOP_WORDS).min(MAX_TOP);
    let corpus = state.corpus().await?;
    let filtered = report::filter_by_labels(&corpus.records, &filter);
    let words = report::top_words(filtered, top);
    Ok(Json(WordsResp {
        no_data: words.is_empty(),
        words,
    })
    .into_response())
}

#[derive(Serialize)]
struct ByLabelResp {
    labels: Vec<LabelWords>,
}

/// Per-label top words over the whole corpus; the label filter does not apply here.
async fn words_by_label(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let top = q.top.unwrap_or(DEFAULT_TOP_WORDS).min(MAX_TOP);
    let corpus = state.corpus().await?;
    Ok(Json(ByLabelResp {
        labels: report::words_by_label(&corpus.records, top),
    })
    .into_response())
}

async fn histogram(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let filter = parse_labels(q.labels.as_deref())?;
    let bins = q.bins.unwrap_or(DEFAULT_HISTOGRAM_BINS);
    if bins == 0 || bins > MAX_BINS {
        return Err(ApiError::BadRequest(format!(
            "bins must be between 1 and {MAX_BINS}"
        )));
    }
    let corpus = state.corpus().await?;
    let filtered = report::filter_by_labels(&corpus.records, &filter);
    Ok(Json(json!({
        "no_data": filtered.is_empty(),
        "total": filtered.len(),
        "bins": report::score_histogram(&filtered, bins),
    }))
    .into_response())
}

#[derive(Deserialize)]
struct AnalyzeReq {
    #[serde(default)]
    text: Option<String>,
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<Analysis>, ApiError> {
    let ctx = Arc::clone(&state.ctx);
    let analysis = tokio::task::spawn_blocking(move || ctx.analyze_text(body.text.as_deref()))
        .await
        .map_err(|e| ApiError::Internal(format!("analyze task failed: {e}")))?
        .map_err(ApiError::Unavailable)?;
    info!(
        target: "api",
        score = analysis.sentiment_score,
        label = %analysis.sentiment_label,
        "analyzed comment"
    );
    Ok(Json(analysis))
}
