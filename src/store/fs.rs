// src/store/fs.rs
//! JSON-file shard store: one file per `(topic, day)`.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use metrics::counter;

use super::{DateKey, ShardStore};
use crate::article::ArticleRecord;
use crate::topic::Topic;

const DATE_FMT: &str = "%Y-%m-%d";

/// Stores each shard at `<dir>/<topic>-<YYYY-MM-DD>.json`.
#[derive(Debug, Clone)]
pub struct FileShardStore {
    dir: PathBuf,
}

impl FileShardStore {
    /// Create the store, making sure the directory exists.
    pub fn open<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating data dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn shard_path(&self, topic: Topic, date: DateKey) -> PathBuf {
        self.dir
            .join(format!("{}-{}.json", topic, date.format(DATE_FMT)))
    }
}

/// Parse `<topic>-<date>.json` back into a date, if it belongs to `topic`.
fn date_from_file_name(topic: Topic, name: &str) -> Option<DateKey> {
    let rest = name.strip_prefix(topic.as_str())?.strip_prefix('-')?;
    let stem = rest.strip_suffix(".json")?;
    NaiveDate::parse_from_str(stem, DATE_FMT).ok()
}

#[async_trait::async_trait]
impl ShardStore for FileShardStore {
    async fn load(&self, topic: Topic, date: DateKey) -> Vec<ArticleRecord> {
        let path = self.shard_path(topic, date);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = ?e, path = %path.display(), "unreadable shard, treating as empty");
                counter!("shard_corrupt_total").increment(1);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<ArticleRecord>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "corrupt shard, treating as empty");
                counter!("shard_corrupt_total").increment(1);
                Vec::new()
            }
        }
    }

    async fn save(&self, topic: Topic, date: DateKey, records: &[ArticleRecord]) -> Result<()> {
        let path = self.shard_path(topic, date);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(records).context("serializing shard")?;
        tokio::fs::write(&tmp, json.as_bytes())
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e).with_context(|| format!("replacing {}", path.display()));
        }
        Ok(())
    }

    async fn list_dates(&self, topic: Topic) -> Result<BTreeSet<DateKey>> {
        let mut out = BTreeSet::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(out),
            Err(e) => {
                return Err(e).with_context(|| format!("listing {}", self.dir.display()))
            }
        };
        while let Some(entry) = entries.next_entry().await.context("reading dir entry")? {
            let name = entry.file_name();
            if let Some(date) = name.to_str().and_then(|n| date_from_file_name(topic, n)) {
                out.insert(date);
            }
        }
        Ok(out)
    }

    async fn delete(&self, topic: Topic, date: DateKey) -> Result<()> {
        let path = self.shard_path(topic, date);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("deleting {}", path.display())),
        }
    }

    fn name(&self) -> &'static str {
        "fs"
    }
}
