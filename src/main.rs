//! Komentar sentiment service: binary entrypoint.
//! Loads config, builds the pipeline context and serves the read API.

use komentar_sentiment::{app, AppState, PipelineConfig};
use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON lines with `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("komentar_sentiment=info,warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    // The runtime may already have a global subscriber installed.
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if res.is_err() {
        warn!("tracing subscriber already set; keeping the existing one");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = PipelineConfig::load_default()?;
    info!(
        source = %cfg.source.path.display(),
        mode = %cfg.source.mode,
        parallel = cfg.processing.parallel,
        cache = cfg.cache.enabled,
        "pipeline config loaded"
    );

    let state = AppState::from_config(&cfg);

    // Warm services and the corpus cache in the background; requests still work if this fails.
    let warm = state.clone();
    tokio::task::spawn_blocking(move || match warm.warm_up() {
        Ok(corpus) => info!(records = corpus.len(), "corpus warm-up done"),
        Err(e) => warn!(error = %e, "corpus warm-up failed; requests will report data unavailable"),
    });

    let router = app(state)?;
    Ok(router.into())
}
