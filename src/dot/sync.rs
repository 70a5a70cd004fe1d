//! DotSyncer: periodic status polling for every known device
//!
//! Runs in a background tokio task. Each cycle fetches device status one
//! device at a time and replaces the snapshot map wholesale. A cycle can
//! also be requested early (after a button press or an action).

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Notify, RwLock};
use tokio::time::{self, Duration, MissedTickBehavior};

use crate::dot::client::{DeviceApi, DotError};
use crate::models::{DeviceInfo, DeviceSnapshot};

/// Last-known poll results shared with the API handlers
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoordinatorState {
    pub snapshots: BTreeMap<String, DeviceSnapshot>,
    pub last_update_success: bool,
    pub last_error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Background poll coordinator
pub struct DotSyncer {
    api: Arc<dyn DeviceApi>,
    devices: Vec<DeviceInfo>,
    interval: Duration,
    state: RwLock<CoordinatorState>,
    refresh: Notify,
}

impl DotSyncer {
    pub fn new(api: Arc<dyn DeviceApi>, devices: Vec<DeviceInfo>, interval: Duration) -> Self {
        Self {
            api,
            devices,
            interval,
            state: RwLock::new(CoordinatorState::default()),
            refresh: Notify::new(),
        }
    }

    pub fn api(&self) -> &Arc<dyn DeviceApi> {
        &self.api
    }

    /// Initial poll at startup; failure aborts setup
    pub async fn first_refresh(&self) -> Result<(), DotError> {
        self.poll_once().await
    }

    /// Start the background poll loop (runs forever)
    pub async fn start(self: Arc<Self>) {
        tracing::info!(
            "[DotSync] Starting background poll (interval: {}s, devices: {})",
            self.interval.as_secs(),
            self.devices.len()
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first_refresh already covered the immediate tick
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.refresh.notified() => {
                    tracing::debug!("[DotSync] Refresh requested");
                    ticker.reset();
                }
            }

            if let Err(e) = self.poll_once().await {
                tracing::warn!("[DotSync] Poll cycle failed: {}", e);
            }
        }
    }

    /// Wake the poll loop for an immediate cycle
    pub fn request_refresh(&self) {
        self.refresh.notify_one();
    }

    /// Consume a pending refresh request, if any
    #[cfg(test)]
    pub(crate) async fn take_refresh_request(&self) -> bool {
        time::timeout(Duration::from_millis(50), self.refresh.notified())
            .await
            .is_ok()
    }

    /// Run one poll cycle across all devices
    pub async fn poll_once(&self) -> Result<(), DotError> {
        let mut snapshots = BTreeMap::new();

        for dev in &self.devices {
            match self.api.get_device_status(&dev.id).await {
                Ok(status) => {
                    snapshots.insert(dev.id.clone(), DeviceSnapshot::from_status(dev, status));
                }
                Err(e) if e.is_fatal() => {
                    let mut state = self.state.write().await;
                    state.last_update_success = false;
                    state.last_error = Some(format!("{} (device {})", e, dev.id));
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("[DotSync] Failed to get status for {}: {}", dev.id, e);
                    snapshots.insert(dev.id.clone(), DeviceSnapshot::offline(dev));
                }
            }
        }

        let online = snapshots.values().filter(|s| s.online).count();
        let mut state = self.state.write().await;
        state.snapshots = snapshots;
        state.last_update_success = true;
        state.last_error = None;
        state.last_updated = Some(Utc::now());

        tracing::debug!(
            "[DotSync] Cycle complete: {}/{} devices online",
            online,
            state.snapshots.len()
        );

        Ok(())
    }

    pub async fn state(&self) -> CoordinatorState {
        self.state.read().await.clone()
    }

    pub async fn snapshot(&self, device_id: &str) -> Option<DeviceSnapshot> {
        self.state.read().await.snapshots.get(device_id).cloned()
    }

    pub async fn owns_device(&self, device_id: &str) -> bool {
        self.state.read().await.snapshots.contains_key(device_id)
    }

    pub async fn last_update_success(&self) -> bool {
        self.state.read().await.last_update_success
    }
}
