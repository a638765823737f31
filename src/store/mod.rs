// src/store/mod.rs
//! Durable per-topic, per-day shard storage.

pub mod fs;
pub mod memory;

use std::collections::BTreeSet;

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};

use crate::article::ArticleRecord;
use crate::topic::Topic;

pub use fs::FileShardStore;
pub use memory::MemoryShardStore;

/// Calendar day a shard belongs to (the fetch day, UTC).
pub type DateKey = NaiveDate;

/// Hard cap of records per shard; also the per-topic daily quota.
pub const MAX_RECORDS_PER_SHARD: usize = 10;

/// Today's date key in UTC.
pub fn today_utc() -> DateKey {
    Utc::now().date_naive()
}

/// First date still inside the retention window. Shards strictly before it are expired.
pub fn retention_cutoff(today: DateKey, window_days: u32) -> DateKey {
    today - Duration::days(i64::from(window_days))
}

#[async_trait::async_trait]
pub trait ShardStore: Send + Sync {
    /// Load a shard. Missing or unreadable shards yield an empty list.
    async fn load(&self, topic: Topic, date: DateKey) -> Vec<ArticleRecord>;

    /// Replace the full contents of a shard atomically.
    async fn save(&self, topic: Topic, date: DateKey, records: &[ArticleRecord]) -> Result<()>;

    /// Dates that currently have a shard for `topic`.
    async fn list_dates(&self, topic: Topic) -> Result<BTreeSet<DateKey>>;

    async fn delete(&self, topic: Topic, date: DateKey) -> Result<()>;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_is_window_days_before_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(
            retention_cutoff(today, 30),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(retention_cutoff(today, 0), today);
    }
}
