//! Deployment log poller
//!
//! After a deployment is accepted, a background task fetches the log tail on
//! a fixed interval and publishes each snapshot over a watch channel. The
//! task is cancellable: teardown or a terminal marker stops it, so no timer
//! outlives the owning view.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::{KubernsApi, LogEntry};

/// Fixed polling period for the deployment log tail
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Substrings in a log message that indicate deployment completion.
///
/// Only success markers are recognized; failure is reported through the
/// submission path, not through log content.
const SUCCESS_MARKERS: [&str; 2] = ["success", "active"];

/// Deployment lifecycle as observed by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    Idle,
    Deploying,
    Deployed,
    Failed,
}

/// One published poll result: full log snapshot plus the derived state.
///
/// Each tick replaces the previous snapshot wholesale, so out-of-order
/// arrival is harmless.
#[derive(Debug, Clone)]
pub struct LogSnapshot {
    pub state: DeployState,
    pub entries: Vec<LogEntry>,
}

/// Handle to the background polling task.
///
/// Dropping the watcher cancels the task.
pub struct LogWatcher {
    updates: watch::Receiver<LogSnapshot>,
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl LogWatcher {
    /// Spawn the polling loop for an instance.
    ///
    /// The first fetch happens immediately, then every `interval`. Fetch
    /// errors are logged and the loop keeps going; the loop ends on a
    /// terminal marker or cancellation and never resumes.
    pub fn spawn<C>(client: Arc<C>, instance_id: i64, interval: Duration) -> Self
    where
        C: KubernsApi + 'static,
    {
        let (snapshot_tx, snapshot_rx) = watch::channel(LogSnapshot {
            state: DeployState::Deploying,
            entries: Vec::new(),
        });
        let (cancel_tx, mut cancel_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel_rx.changed() => break,
                    _ = ticker.tick() => {
                        match client.fetch_logs(instance_id).await {
                            Ok(entries) => {
                                let done = entries.iter().any(|e| is_terminal(&e.message));
                                let state = if done {
                                    DeployState::Deployed
                                } else {
                                    DeployState::Deploying
                                };
                                let _ = snapshot_tx.send(LogSnapshot { state, entries });
                                if done {
                                    break;
                                }
                            }
                            // Diagnostics only, the loop keeps polling
                            Err(err) => log::warn!("log poll failed: {}", err),
                        }
                    }
                }
            }
        });

        Self {
            updates: snapshot_rx,
            cancel: cancel_tx,
            task,
        }
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<LogSnapshot> {
        self.updates.clone()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> LogSnapshot {
        self.updates.borrow().clone()
    }

    /// Stop polling. Idempotent; also triggered by Drop.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Wait for the polling task to end and return the final snapshot
    pub async fn wait(mut self) -> LogSnapshot {
        let _ = (&mut self.task).await;
        self.updates.borrow().clone()
    }
}

impl Drop for LogWatcher {
    fn drop(&mut self) {
        let _ = self.cancel.send(true);
    }
}

/// Whether a log message contains a recognized completion marker
pub fn is_terminal(message: &str) -> bool {
    SUCCESS_MARKERS.iter().any(|marker| message.contains(marker))
}
