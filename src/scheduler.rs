// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::refresh::{RefreshOrchestrator, RefreshOutcome};
use crate::topic::Topic;

/// Spawn the periodic refresh loop. Each tick (the first fires immediately)
/// triggers every topic as an independent task; topics still busy from the
/// previous tick drop the trigger.
pub fn spawn_refresh_scheduler(
    orchestrator: Arc<RefreshOrchestrator>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            counter!("scheduler_ticks_total").increment(1);
            for topic in Topic::ALL {
                let orch = orchestrator.clone();
                tokio::spawn(async move { trigger(&orch, topic).await });
            }
        }
    })
}

async fn trigger(orch: &RefreshOrchestrator, topic: Topic) {
    match orch.run_topic(topic).await {
        Ok(RefreshOutcome::Refreshed { added, total }) => {
            tracing::debug!(target: "scheduler", %topic, added, total, "scheduled refresh done");
        }
        Ok(other) => {
            tracing::debug!(target: "scheduler", %topic, outcome = ?other, "scheduled refresh skipped");
        }
        Err(e) => {
            tracing::warn!(target: "scheduler", %topic, kind = e.kind(), error = %e, "scheduled refresh failed");
        }
    }
}
