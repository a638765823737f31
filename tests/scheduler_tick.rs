// tests/scheduler_tick.rs

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use topic_news::scheduler::spawn_refresh_scheduler;
use topic_news::store::{today_utc, MemoryShardStore, ShardStore};
use topic_news::Topic;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn first_tick_refreshes_every_topic() {
    let store = Arc::new(MemoryShardStore::new());
    let search = Arc::new(ScriptedSearch::returning(vec![raw(1), raw(2)]));
    let orch = Arc::new(orchestrator(
        store.clone(),
        search.clone(),
        Arc::new(ScriptedRewriter::default()),
    ));

    let handle = spawn_refresh_scheduler(orch, Duration::from_secs(3600));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let mut filled = 0;
        for topic in Topic::ALL {
            if store.load(topic, today_utc()).await.len() == 2 {
                filled += 1;
            }
        }
        if filled == Topic::ALL.len() {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "scheduler did not refresh every topic"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    handle.abort();

    assert_eq!(search.calls(), Topic::ALL.len());
}
