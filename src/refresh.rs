//! # Refresh
//! Fetch → dedupe → quota-cap → rewrite → persist, one run per topic.
//!
//! A topic has at most one run in flight. Triggers that arrive while a run is
//! active are dropped, so bursts collapse into a single effective refresh.
//! Different topics refresh independently.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use metrics::{counter, gauge};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::article::{ArticleRecord, RawArticle, RewriteStatus};
use crate::config::topics::TopicCatalog;
use crate::ingest::SearchProvider;
use crate::retention::RetentionSweeper;
use crate::rewrite::{finish_rewrite, RewriteProvider};
use crate::store::{retention_cutoff, today_utc, DateKey, ShardStore, MAX_RECORDS_PER_SHARD};
use crate::topic::Topic;

/// What a single trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Another run for the topic was active; this trigger was dropped.
    AlreadyRunning,
    /// Today's shard was already full; no provider calls were made.
    QuotaMet { total: usize },
    Refreshed { added: usize, total: usize },
}

/// Failures that abort a topic's run for this trigger. Nothing is persisted.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("search provider failed for {topic}: {source:#}")]
    Upstream {
        topic: Topic,
        #[source]
        source: anyhow::Error,
    },
    #[error("saving shard for {topic} failed: {source:#}")]
    Storage {
        topic: Topic,
        #[source]
        source: anyhow::Error,
    },
}

impl RefreshError {
    pub fn kind(&self) -> &'static str {
        match self {
            RefreshError::Upstream { .. } => "upstream",
            RefreshError::Storage { .. } => "storage",
        }
    }
}

pub struct RefreshOrchestrator {
    store: Arc<dyn ShardStore>,
    search: Arc<dyn SearchProvider>,
    rewriter: Arc<dyn RewriteProvider>,
    catalog: Arc<TopicCatalog>,
    sweeper: RetentionSweeper,
    window_days: u32,
    guards: HashMap<Topic, Arc<Mutex<()>>>,
}

impl RefreshOrchestrator {
    pub fn new(
        store: Arc<dyn ShardStore>,
        search: Arc<dyn SearchProvider>,
        rewriter: Arc<dyn RewriteProvider>,
        catalog: Arc<TopicCatalog>,
        window_days: u32,
    ) -> Self {
        let guards = Topic::ALL
            .iter()
            .map(|t| (*t, Arc::new(Mutex::new(()))))
            .collect();
        Self {
            sweeper: RetentionSweeper::new(store.clone(), window_days),
            store,
            search,
            rewriter,
            catalog,
            window_days,
            guards,
        }
    }

    /// True while a run for `topic` holds its guard.
    pub fn is_running(&self, topic: Topic) -> bool {
        self.guards
            .get(&topic)
            .is_some_and(|g| g.try_lock().is_err())
    }

    fn try_acquire(&self, topic: Topic) -> Option<OwnedMutexGuard<()>> {
        self.guards.get(&topic)?.clone().try_lock_owned().ok()
    }

    /// Refresh `topic` for the current UTC day.
    pub async fn run_topic(&self, topic: Topic) -> Result<RefreshOutcome, RefreshError> {
        self.run_topic_on(topic, today_utc()).await
    }

    /// Refresh every topic in turn. One topic failing does not stop the others.
    pub async fn refresh_all(&self) -> Vec<(Topic, Result<RefreshOutcome, RefreshError>)> {
        let mut out = Vec::with_capacity(Topic::ALL.len());
        for topic in Topic::ALL {
            out.push((topic, self.run_topic(topic).await));
        }
        out
    }

    /// Refresh `topic` treating `today` as the current day.
    pub async fn run_topic_on(
        &self,
        topic: Topic,
        today: DateKey,
    ) -> Result<RefreshOutcome, RefreshError> {
        let Some(_guard) = self.try_acquire(topic) else {
            counter!("refresh_skipped_total", "reason" => "busy").increment(1);
            tracing::info!(%topic, "refresh already running, trigger dropped");
            return Ok(RefreshOutcome::AlreadyRunning);
        };
        counter!("refresh_runs_total").increment(1);

        let mut shard = self.store.load(topic, today).await;
        if shard.len() >= MAX_RECORDS_PER_SHARD {
            counter!("refresh_skipped_total", "reason" => "quota").increment(1);
            tracing::info!(%topic, total = shard.len(), "daily quota already met");
            return Ok(RefreshOutcome::QuotaMet { total: shard.len() });
        }

        let fetched = match self.search.search(self.catalog.profile(topic)).await {
            Ok(v) => v,
            Err(source) => {
                counter!("refresh_failures_total", "kind" => "upstream").increment(1);
                tracing::warn!(error = ?source, %topic, provider = self.search.name(), "search provider error");
                return Err(RefreshError::Upstream { topic, source });
            }
        };

        let known = self.known_ids(topic, today, &shard).await;
        let room = MAX_RECORDS_PER_SHARD - shard.len();
        let candidates = select_candidates(fetched, &known, room);

        let mut added = 0usize;
        for article in &candidates {
            shard.push(self.build_record(topic, article).await);
            added += 1;
        }

        if added > 0 {
            if let Err(source) = self.store.save(topic, today, &shard).await {
                counter!("refresh_failures_total", "kind" => "storage").increment(1);
                tracing::error!(error = ?source, %topic, %today, store = self.store.name(), "failed to persist shard");
                return Err(RefreshError::Storage { topic, source });
            }
            counter!("refresh_articles_added_total").increment(added as u64);
        }

        if let Err(e) = self.sweeper.sweep(topic, today).await {
            tracing::warn!(error = ?e, %topic, "retention sweep failed");
        }

        gauge!("refresh_last_run_ts").set(Utc::now().timestamp() as f64);
        tracing::info!(%topic, added, total = shard.len(), "refresh finished");
        Ok(RefreshOutcome::Refreshed {
            added,
            total: shard.len(),
        })
    }

    /// Ids already stored for the topic anywhere inside the retention window.
    async fn known_ids(
        &self,
        topic: Topic,
        today: DateKey,
        today_shard: &[ArticleRecord],
    ) -> HashSet<String> {
        let mut known: HashSet<String> = today_shard.iter().map(|r| r.id.clone()).collect();
        let cutoff = retention_cutoff(today, self.window_days);
        match self.store.list_dates(topic).await {
            Ok(dates) => {
                for date in dates.into_iter().filter(|d| *d >= cutoff && *d != today) {
                    known.extend(self.store.load(topic, date).await.into_iter().map(|r| r.id));
                }
            }
            Err(e) => {
                tracing::warn!(error = ?e, %topic, "listing shards failed, deduping against today only");
            }
        }
        known
    }

    async fn build_record(&self, topic: Topic, article: &RawArticle) -> ArticleRecord {
        let rewritten = match self.rewriter.rewrite(article).await {
            Ok(text) => {
                let done = finish_rewrite(article, &text);
                if done.is_none() {
                    tracing::warn!(%topic, url = %article.url, "rewrite output unusable, keeping original");
                }
                done
            }
            Err(e) => {
                tracing::warn!(error = ?e, %topic, url = %article.url, provider = self.rewriter.name(), "rewrite failed, keeping original");
                None
            }
        };

        let (title, body, rewrite) = match rewritten {
            Some((title, body)) => (title, body, RewriteStatus::Rewritten),
            None => {
                counter!("rewrite_fallback_total").increment(1);
                (
                    article.title.clone(),
                    article.original_text().to_string(),
                    RewriteStatus::Fallback,
                )
            }
        };

        ArticleRecord {
            id: article.url.clone(),
            title,
            source: article.source.clone(),
            published_at: article.published_at.clone(),
            rewritten_body: body,
            original_url: article.url.clone(),
            rewrite,
        }
    }
}

/// Keep provider order, drop known or repeated URLs, and stop at `room`.
pub fn select_candidates(
    fetched: Vec<RawArticle>,
    known: &HashSet<String>,
    room: usize,
) -> Vec<RawArticle> {
    let mut taken = HashSet::new();
    fetched
        .into_iter()
        .filter(|a| !a.url.is_empty() && !known.contains(&a.url))
        .filter(|a| taken.insert(a.url.clone()))
        .take(room)
        .collect()
}
