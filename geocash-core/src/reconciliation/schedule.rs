use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use super::cache::ReconciliationCache;

/// When the background task refreshes the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshSchedule {
    /// A single refresh at startup.
    Once,
    /// A refresh at startup, then one per interval.
    Every(Duration),
}

impl RefreshSchedule {
    /// `None` and zero intervals mean one-shot.
    pub fn from_interval(interval: Option<Duration>) -> Self {
        match interval {
            Some(every) if !every.is_zero() => RefreshSchedule::Every(every),
            _ => RefreshSchedule::Once,
        }
    }
}

/// Handle to the background refresh task.
#[derive(Debug)]
pub struct RefreshHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signals the loop to stop and waits for it. A periodic loop finishes
    /// its in-flight refresh first; a pending one-shot refresh is dropped.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        if let Err(err) = self.task.await
            && err.is_panic()
        {
            error!("refresh task panicked: {err}");
        }
    }
}

/// Runs the first refresh immediately, then keeps refreshing per `schedule`.
/// Failures are logged by the cache and never end the loop.
pub fn spawn_refresh_loop(
    cache: Arc<ReconciliationCache>,
    schedule: RefreshSchedule,
) -> RefreshHandle {
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(refresh_loop(cache, schedule, stop_rx));
    RefreshHandle { stop_tx, task }
}

async fn refresh_loop(
    cache: Arc<ReconciliationCache>,
    schedule: RefreshSchedule,
    mut stop_rx: watch::Receiver<bool>,
) {
    let every = match schedule {
        RefreshSchedule::Once => {
            tokio::select! {
                _ = stop_requested(&mut stop_rx) => {}
                _ = cache.refresh() => {}
            }
            debug!("one-shot terminal refresh finished");
            return;
        }
        RefreshSchedule::Every(every) => every,
    };

    info!(interval = ?every, "periodic terminal refresh enabled");
    let mut ticker = time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = stop_requested(&mut stop_rx) => break,
            _ = ticker.tick() => {}
        }

        // Failures are already logged; the next tick retries.
        let _ = cache.refresh().await;
    }
    debug!("terminal refresh loop stopped");
}

/// Resolves once a stop is signalled. A dropped handle detaches the task
/// instead of stopping it.
async fn stop_requested(stop_rx: &mut watch::Receiver<bool>) {
    if stop_rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
