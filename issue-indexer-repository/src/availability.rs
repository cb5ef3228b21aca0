//! Availability tracking for the remote search engine.
//!
//! The monitor starts optimistic. Failed requests mark the engine down; only
//! the background prober marks it up again, after a successful liveness
//! probe. Each transition notifies the registered callback exactly once,
//! however many threads race to report it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::interfaces::SearchEngineClient;

/// Observer invoked with the new availability state.
pub type AvailabilityCallback = Box<dyn Fn(bool) + Send + Sync>;

/// Shared availability flag plus its single observer.
pub struct AvailabilityMonitor {
    available: AtomicBool,
    callback: RwLock<Option<Arc<dyn Fn(bool) + Send + Sync>>>,
    /// Held from the flip through the notification, so observers see
    /// transitions in the order they happened.
    notify: Mutex<()>,
}

impl std::fmt::Debug for AvailabilityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityMonitor")
            .field("available", &self.is_available())
            .finish_non_exhaustive()
    }
}

impl Default for AvailabilityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl AvailabilityMonitor {
    /// Create a monitor in the available state.
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            callback: RwLock::new(None),
            notify: Mutex::new(()),
        }
    }

    /// Current state.
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Replace the observer.
    pub fn set_callback(&self, callback: AvailabilityCallback) {
        let mut slot = self.callback.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::from(callback));
    }

    /// Flip to unavailable. Returns `true` only for the caller that performed
    /// the transition; that caller has already notified the observer.
    pub fn mark_unavailable(&self) -> bool {
        self.transition(true, false)
    }

    /// Flip to available. Returns `true` only for the caller that performed
    /// the transition; that caller has already notified the observer.
    pub fn mark_available(&self) -> bool {
        self.transition(false, true)
    }

    /// The observer must not mark the monitor itself; reading the state is
    /// fine.
    fn transition(&self, from: bool, to: bool) -> bool {
        let _guard = self.notify.lock().unwrap_or_else(PoisonError::into_inner);
        if self
            .available
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        // Clone out of the lock so the observer may call back into us.
        let callback = self
            .callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(callback) = callback {
            callback(to);
        }
        true
    }
}

/// Spawn the recovery prober.
///
/// Every `poll_interval` the prober checks the monitor; while the engine is
/// marked unavailable it issues one liveness probe bounded by
/// `probe_timeout` and marks the engine available if the probe succeeds.
/// The task exits when `shutdown_rx` receives a value or its sender is
/// dropped.
pub fn spawn_prober(
    client: Arc<dyn SearchEngineClient>,
    monitor: Arc<AvailabilityMonitor>,
    poll_interval: Duration,
    probe_timeout: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + poll_interval, poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    probe_once(client.as_ref(), &monitor, probe_timeout).await;
                }
                _ = shutdown_rx.recv() => {
                    debug!("Availability prober stopping");
                    break;
                }
            }
        }
    })
}

/// Run a single recovery check. Does nothing while the engine is available.
pub async fn probe_once(
    client: &dyn SearchEngineClient,
    monitor: &AvailabilityMonitor,
    probe_timeout: Duration,
) {
    if monitor.is_available() {
        return;
    }

    match timeout(probe_timeout, client.health_check()).await {
        Ok(Ok(true)) => {
            if monitor.mark_available() {
                info!("Search engine is available again");
            }
        }
        Ok(Ok(false)) => debug!("Search engine reachable but unhealthy"),
        Ok(Err(e)) => debug!(error = %e, "Search engine still unreachable"),
        Err(_) => warn!(timeout = ?probe_timeout, "Availability probe timed out"),
    }
}
