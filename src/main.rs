//! Topic news service: binary entrypoint.
//! Boots the Axum HTTP server, wires the shard store, providers and the
//! background refresh scheduler.

use std::time::Duration;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use topic_news::config::{AppConfig, TopicCatalog};
use topic_news::metrics::Metrics;
use topic_news::scheduler::spawn_refresh_scheduler;

/// Compact logs by default; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("topic_news=info,warn"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    // Shuttle may already own the global subscriber; ignore that case.
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env();
    let catalog = TopicCatalog::load_default()?;
    let state = topic_news::build_state(&cfg, catalog)?;

    if cfg.refresh_interval_secs > 0 {
        spawn_refresh_scheduler(
            state.orchestrator.clone(),
            Duration::from_secs(cfg.refresh_interval_secs),
        );
    } else {
        tracing::info!("background refresh disabled; use POST /refresh");
    }

    let mut router = topic_news::router(state);
    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = ?e, "metrics recorder not installed"),
    }

    Ok(router.into())
}
