//! # Query
//! Paginated reads across every in-window shard of a topic.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::article::ArticleRecord;
use crate::store::{retention_cutoff, DateKey, ShardStore};
use crate::topic::Topic;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

pub struct QueryService {
    store: Arc<dyn ShardStore>,
    window_days: u32,
}

impl QueryService {
    pub fn new(store: Arc<dyn ShardStore>, window_days: u32) -> Self {
        Self { store, window_days }
    }

    /// All in-window records for `topic`, newest `publishedAt` first, unique by id.
    pub async fn collect(&self, topic: Topic, today: DateKey) -> Result<Vec<ArticleRecord>> {
        let cutoff = retention_cutoff(today, self.window_days);
        let dates = self.store.list_dates(topic).await?;

        // Newest shard first, so arrival order for ties matches a day-by-day walk back.
        let mut seen = HashSet::new();
        let mut all = Vec::new();
        for date in dates.into_iter().rev().filter(|d| *d >= cutoff && *d <= today) {
            for rec in self.store.load(topic, date).await {
                if seen.insert(rec.id.clone()) {
                    all.push(rec);
                }
            }
        }

        // Stable sort: equal timestamps keep arrival order; unparsable ones sink.
        all.sort_by_cached_key(|r| std::cmp::Reverse(published_ts(&r.published_at)));
        Ok(all)
    }

    /// 1-based page of `page_size` records. Out-of-range pages are empty.
    pub async fn get_page(
        &self,
        topic: Topic,
        page: usize,
        page_size: usize,
        today: DateKey,
    ) -> Result<Vec<ArticleRecord>> {
        if page == 0 || page_size == 0 {
            return Ok(Vec::new());
        }
        let all = self.collect(topic, today).await?;
        let start = (page - 1).saturating_mul(page_size);
        Ok(all.into_iter().skip(start).take(page_size).collect())
    }
}

/// RFC 3339 first; offset-less date-times and bare dates are read as UTC.
fn published_ts(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
