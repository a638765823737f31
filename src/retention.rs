//! # Retention
//! Deletes shards that fell out of the rolling retention window.

use std::sync::Arc;

use anyhow::Result;
use metrics::counter;

use crate::store::{retention_cutoff, DateKey, ShardStore};
use crate::topic::Topic;

/// Outcome of one sweep over a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted: Vec<DateKey>,
    pub failed: Vec<DateKey>,
}

pub struct RetentionSweeper {
    store: Arc<dyn ShardStore>,
    window_days: u32,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn ShardStore>, window_days: u32) -> Self {
        Self { store, window_days }
    }

    /// Delete every shard of `topic` dated strictly before `today - window_days`.
    ///
    /// Deletion is best-effort per shard; only failing to enumerate is an error.
    pub async fn sweep(&self, topic: Topic, today: DateKey) -> Result<SweepReport> {
        let cutoff = retention_cutoff(today, self.window_days);
        let dates = self.store.list_dates(topic).await?;

        let mut report = SweepReport::default();
        for date in dates.into_iter().filter(|d| *d < cutoff) {
            match self.store.delete(topic, date).await {
                Ok(()) => report.deleted.push(date),
                Err(e) => {
                    tracing::warn!(error = ?e, %topic, %date, "failed to delete expired shard");
                    report.failed.push(date);
                }
            }
        }

        if !report.deleted.is_empty() || !report.failed.is_empty() {
            counter!("retention_deleted_total").increment(report.deleted.len() as u64);
            tracing::info!(
                %topic,
                %cutoff,
                deleted = report.deleted.len(),
                failed = report.failed.len(),
                "retention sweep"
            );
        }
        Ok(report)
    }
}
