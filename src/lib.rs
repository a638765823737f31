// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod article;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod query;
pub mod refresh;
pub mod retention;
pub mod rewrite;
pub mod scheduler;
pub mod store;
pub mod topic;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::article::{ArticleRecord, ArticleView, RawArticle};
pub use crate::query::QueryService;
pub use crate::refresh::{RefreshError, RefreshOrchestrator, RefreshOutcome};
pub use crate::retention::RetentionSweeper;
pub use crate::store::{DateKey, ShardStore};
pub use crate::topic::Topic;

use std::sync::Arc;

use crate::config::{AppConfig, TopicCatalog};
use crate::ingest::{NewsApiProvider, SearchProvider};
use crate::rewrite::{OpenAiRewriter, RewriteProvider};
use crate::store::FileShardStore;

/// Wire the production stack (file store, NewsAPI, OpenAI) from config.
pub fn build_state(cfg: &AppConfig, catalog: TopicCatalog) -> anyhow::Result<AppState> {
    let store: Arc<dyn ShardStore> = Arc::new(FileShardStore::open(&cfg.data_dir)?);
    let search = Arc::new(NewsApiProvider::new(&cfg.news_api_key, cfg.fetch_page_size)?);
    let rewriter = Arc::new(OpenAiRewriter::new(&cfg.openai_api_key, &cfg.openai_model)?);
    tracing::info!(
        store = store.name(),
        search = search.name(),
        rewriter = rewriter.name(),
        "pipeline wired"
    );

    let orchestrator = Arc::new(RefreshOrchestrator::new(
        store.clone(),
        search,
        rewriter,
        Arc::new(catalog),
        cfg.retention_days,
    ));
    let query = Arc::new(QueryService::new(store, cfg.retention_days));
    Ok(AppState {
        query,
        orchestrator,
    })
}
