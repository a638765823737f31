// tests/common/mod.rs
//
// Shared fixtures: scripted providers and store wrappers.
#![allow(dead_code)]

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use parking_lot::Mutex;
use tokio::sync::{Notify, Semaphore};

use topic_news::article::{ArticleRecord, RawArticle, RewriteStatus};
use topic_news::config::{QueryProfile, TopicCatalog};
use topic_news::ingest::SearchProvider;
use topic_news::rewrite::RewriteProvider;
use topic_news::store::{DateKey, MemoryShardStore, ShardStore};
use topic_news::{RefreshOrchestrator, Topic};

/// Serve `app` on an ephemeral localhost port and return its base URL.
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    format!("http://{addr}")
}

pub fn day(y: i32, m: u32, d: u32) -> DateKey {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn raw(n: usize) -> RawArticle {
    RawArticle {
        title: format!("Headline {n}"),
        description: Some(format!("Description {n}")),
        content: Some(format!("Content {n}")),
        source: "Wire".into(),
        url: format!("https://news.example/{n}"),
        published_at: format!("2024-05-01T{:02}:00:00Z", n % 24),
    }
}

pub fn record(id: &str, published_at: &str) -> ArticleRecord {
    ArticleRecord {
        id: id.to_string(),
        title: format!("T {id}"),
        source: "Wire".into(),
        published_at: published_at.to_string(),
        rewritten_body: format!("Body {id}"),
        original_url: id.to_string(),
        rewrite: RewriteStatus::Rewritten,
    }
}

/// Returns a fixed list (or an error) and counts calls.
pub struct ScriptedSearch {
    pub articles: Mutex<Vec<RawArticle>>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl ScriptedSearch {
    pub fn returning(articles: Vec<RawArticle>) -> Self {
        Self {
            articles: Mutex::new(articles),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            articles: Mutex::new(Vec::new()),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SearchProvider for ScriptedSearch {
    async fn search(&self, _profile: &QueryProfile) -> Result<Vec<RawArticle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("search provider returned 503"));
        }
        Ok(self.articles.lock().clone())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Blocks inside `search` until released, so tests can overlap triggers.
pub struct GatedSearch {
    pub articles: Vec<RawArticle>,
    pub entered: Notify,
    /// One permit lets one parked search return.
    pub release: Semaphore,
    pub calls: AtomicUsize,
}

impl GatedSearch {
    pub fn new(articles: Vec<RawArticle>) -> Self {
        Self {
            articles,
            entered: Notify::new(),
            release: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl SearchProvider for GatedSearch {
    async fn search(&self, _profile: &QueryProfile) -> Result<Vec<RawArticle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        let permit = self.release.acquire().await?;
        permit.forget();
        Ok(self.articles.clone())
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

/// Rewrites to a JSON headline/body pair; fails for selected URLs.
#[derive(Default)]
pub struct ScriptedRewriter {
    pub fail_urls: HashSet<String>,
    pub seen: Mutex<Vec<String>>,
}

impl ScriptedRewriter {
    pub fn failing_for(urls: &[&str]) -> Self {
        Self {
            fail_urls: urls.iter().map(|u| u.to_string()).collect(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }
}

#[async_trait::async_trait]
impl RewriteProvider for ScriptedRewriter {
    async fn rewrite(&self, article: &RawArticle) -> Result<String> {
        self.seen.lock().push(article.url.clone());
        if self.fail_urls.contains(&article.url) {
            return Err(anyhow!("rewrite provider timed out"));
        }
        Ok(serde_json::json!({
            "headline": format!("**Title:** Rewritten {} - NWO News", article.title),
            "body": format!("Authored by NWO News \u{2014} desk\nNew take on {}.", article.title),
        })
        .to_string())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Memory store whose `save` always fails.
#[derive(Default)]
pub struct FailingSaveStore {
    pub inner: MemoryShardStore,
}

#[async_trait::async_trait]
impl ShardStore for FailingSaveStore {
    async fn load(&self, topic: Topic, date: DateKey) -> Vec<ArticleRecord> {
        self.inner.load(topic, date).await
    }
    async fn save(&self, _topic: Topic, _date: DateKey, _records: &[ArticleRecord]) -> Result<()> {
        Err(anyhow!("disk full"))
    }
    async fn list_dates(&self, topic: Topic) -> Result<BTreeSet<DateKey>> {
        self.inner.list_dates(topic).await
    }
    async fn delete(&self, topic: Topic, date: DateKey) -> Result<()> {
        self.inner.delete(topic, date).await
    }
    fn name(&self) -> &'static str {
        "failing-save"
    }
}

pub fn orchestrator(
    store: Arc<dyn ShardStore>,
    search: Arc<dyn SearchProvider>,
    rewriter: Arc<dyn RewriteProvider>,
) -> RefreshOrchestrator {
    RefreshOrchestrator::new(
        store,
        search,
        rewriter,
        Arc::new(TopicCatalog::default_seed()),
        30,
    )
}
