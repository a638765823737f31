// src/store/memory.rs
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use anyhow::{anyhow, Result};

use super::{DateKey, ShardStore};
use crate::article::ArticleRecord;
use crate::topic::Topic;

/// In-process shard store. Whole shards are swapped under the lock, so readers
/// never see a half-written shard.
#[derive(Debug, Default)]
pub struct MemoryShardStore {
    shards: RwLock<HashMap<(Topic, DateKey), Vec<ArticleRecord>>>,
}

impl MemoryShardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ShardStore for MemoryShardStore {
    async fn load(&self, topic: Topic, date: DateKey) -> Vec<ArticleRecord> {
        match self.shards.read() {
            Ok(g) => g.get(&(topic, date)).cloned().unwrap_or_default(),
            Err(_) => {
                tracing::warn!(%topic, %date, "memory store lock poisoned, treating shard as empty");
                Vec::new()
            }
        }
    }

    async fn save(&self, topic: Topic, date: DateKey, records: &[ArticleRecord]) -> Result<()> {
        let mut g = self
            .shards
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        g.insert((topic, date), records.to_vec());
        Ok(())
    }

    async fn list_dates(&self, topic: Topic) -> Result<BTreeSet<DateKey>> {
        let g = self
            .shards
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(g.keys()
            .filter(|(t, _)| *t == topic)
            .map(|(_, d)| *d)
            .collect())
    }

    async fn delete(&self, topic: Topic, date: DateKey) -> Result<()> {
        let mut g = self
            .shards
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        g.remove(&(topic, date));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
