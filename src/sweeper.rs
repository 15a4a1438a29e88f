use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};
use tracing::{debug, info};

use crate::metrics::TRACKER_COUNT;
use crate::state::AppState;

/// Handle to the background cleanup task. The binary keeps it alive for the
/// process lifetime; tests simply never spawn one.
pub struct SweeperHandle {
    task: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

// Periodic cleanup - drops trackers with no in-window requests and no live
// block, bounding memory growth from one-off keys
pub fn spawn_sweeper(state: Arc<AppState>, period: Duration) -> SweeperHandle {
    let task = tokio::spawn(async move {
        debug!(period_secs = period.as_secs(), "tracker sweeper started");
        let mut ticker = interval(period);

        loop {
            ticker.tick().await;
            let removed = state.limiter.sweep(Utc::now());
            TRACKER_COUNT.set(state.limiter.tracker_count() as f64);
            if removed > 0 {
                info!(removed, remaining = state.limiter.tracker_count(), "swept idle trackers");
            }
        }
    });

    SweeperHandle { task }
}
