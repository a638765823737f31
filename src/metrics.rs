use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and describe the pipeline series.
    /// Call once per process.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        describe();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe() {
    describe_counter!("refresh_runs_total", "Refresh runs that acquired the topic guard.");
    describe_counter!(
        "refresh_skipped_total",
        "Refresh triggers skipped (reason=busy|quota)."
    );
    describe_counter!(
        "refresh_failures_total",
        "Refresh runs aborted (kind=upstream|storage)."
    );
    describe_counter!("refresh_articles_added_total", "Articles appended to shards.");
    describe_counter!(
        "rewrite_fallback_total",
        "Articles stored with original text after a failed rewrite."
    );
    describe_counter!("search_provider_errors_total", "Search provider fetch errors.");
    describe_counter!("shard_corrupt_total", "Shards that failed to load and were treated as empty.");
    describe_counter!("retention_deleted_total", "Shards deleted by the retention sweeper.");
    describe_counter!("scheduler_ticks_total", "Scheduler ticks.");
    describe_gauge!("refresh_last_run_ts", "Unix ts of the last completed refresh run.");
}
