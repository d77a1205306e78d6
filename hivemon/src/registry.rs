//! Live device registry.
//!
//! Owns the device table. The poller writes per-device status and
//! stats; the API layer adds, removes and lists. Every mutation is
//! persisted through the store. The table lock is never held across an
//! await point; persistence works on a cloned snapshot.

use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::device::{DeviceFamily, DeviceRecord, DeviceStatus, NormalizedStats};
use crate::error::{Error, Result};
use crate::store::DeviceStore;
use crate::tracing::prelude::*;

pub struct DeviceRegistry {
    devices: Mutex<Vec<DeviceRecord>>,
    store: Arc<dyn DeviceStore>,
}

impl DeviceRegistry {
    pub fn new(store: Arc<dyn DeviceStore>) -> Self {
        Self {
            devices: Mutex::new(Vec::new()),
            store,
        }
    }

    /// Seed the table from the store. Called once at startup.
    pub async fn load(&self) {
        let loaded = self.store.load_all().await;
        if !loaded.is_empty() {
            info!("loaded {} device(s) from store", loaded.len());
        }
        *self.devices.lock() = loaded;
    }

    /// Snapshot of all records.
    pub fn list(&self) -> Vec<DeviceRecord> {
        self.devices.lock().clone()
    }

    /// Register a device.
    ///
    /// The record starts offline with empty stats until the first poll
    /// pass reaches it. A store write failure surfaces to the caller,
    /// but the in-memory insert is not rolled back.
    pub async fn add(
        &self,
        host: &str,
        port: Option<u16>,
        family: DeviceFamily,
    ) -> Result<DeviceRecord> {
        let host = host.trim();
        if host.is_empty() {
            return Err(Error::InvalidDevice("host must not be empty".into()));
        }

        let record = DeviceRecord {
            id: Uuid::new_v4().to_string(),
            host: host.to_string(),
            port,
            family,
            status: DeviceStatus::Offline,
            stats: NormalizedStats::default(),
        };

        let snapshot = {
            let mut devices = self.devices.lock();
            devices.push(record.clone());
            devices.clone()
        };
        self.store.save_all(&snapshot).await?;

        info!(id = %record.id, host = %record.host, family = %record.family, "device added");
        Ok(record)
    }

    /// Remove a device. Unknown ids are a no-op.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let snapshot = {
            let mut devices = self.devices.lock();
            let before = devices.len();
            devices.retain(|d| d.id != id);
            if devices.len() == before {
                return Ok(());
            }
            devices.clone()
        };
        self.store.save_all(&snapshot).await?;

        info!(id = %id, "device removed");
        Ok(())
    }

    /// Overwrite one record's status and stats together. Poller-only.
    ///
    /// A miss means the device was removed mid-pass; the stale result
    /// is dropped.
    pub fn update(&self, id: &str, status: DeviceStatus, stats: NormalizedStats) {
        let mut devices = self.devices.lock();
        match devices.iter_mut().find(|d| d.id == id) {
            Some(device) => {
                device.status = status;
                device.stats = stats;
            }
            None => debug!(id = %id, "dropping poll result for removed device"),
        }
    }

    /// Aggregate hashrate (MH/s) over devices currently online.
    pub fn online_hashrate_mhs(&self) -> f64 {
        self.devices
            .lock()
            .iter()
            .filter(|d| d.status == DeviceStatus::Online)
            .map(|d| d.stats.hashrate_mhs)
            .sum()
    }
}
