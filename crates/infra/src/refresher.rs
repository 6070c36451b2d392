//! Periodic policy reload.
//!
//! A failed reload is logged and retried on the next tick; the engine keeps
//! serving its last good snapshot in the meantime.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use relaygate_auth::PolicyEngine;

/// Reload statistics, shared with the handle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshStats {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub consecutive_failures: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Handle to control a running refresher.
#[derive(Debug)]
pub struct PolicyRefresherHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
    stats: Arc<Mutex<RefreshStats>>,
}

impl PolicyRefresherHandle {
    /// Request shutdown and wait for the loop to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.join.await;
    }

    /// Current reload statistics.
    pub fn stats(&self) -> RefreshStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

/// Background task calling [`PolicyEngine::load`] every `interval`.
pub struct PolicyRefresher {
    engine: Arc<PolicyEngine>,
    interval: Duration,
}

impl PolicyRefresher {
    pub fn new(engine: Arc<PolicyEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Spawn the refresh loop on the current tokio runtime.
    ///
    /// The first reload happens one interval after spawning; the engine was
    /// already loaded when it was constructed.
    pub fn spawn(self) -> PolicyRefresherHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let stats = Arc::new(Mutex::new(RefreshStats::default()));
        let task_stats = stats.clone();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval = ?self.interval, "policy refresher started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => self.refresh_once(&task_stats).await,
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("policy refresher stopped");
        });

        PolicyRefresherHandle { shutdown, join, stats }
    }

    async fn refresh_once(&self, stats: &Mutex<RefreshStats>) {
        let result = self.engine.load().await;

        let Ok(mut stats) = stats.lock() else {
            return;
        };
        stats.attempts += 1;
        match result {
            Ok(report) => {
                stats.successes += 1;
                stats.consecutive_failures = 0;
                stats.last_success = Some(report.loaded_at);
                stats.last_error = None;
                debug!(rules = report.rules, assignments = report.assignments, "scheduled policy refresh ok");
            }
            Err(e) => {
                stats.failures += 1;
                stats.consecutive_failures += 1;
                stats.last_error = Some(e.to_string());
                warn!(
                    error = %e,
                    consecutive_failures = stats.consecutive_failures,
                    "scheduled policy refresh failed; serving last good snapshot"
                );
            }
        }
    }
}
