//! Device persistence.
//!
//! The registry persists the full device list after every mutation and
//! reloads it at startup. The on-disk format is the serialized record
//! list itself.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::device::DeviceRecord;
use crate::error::Result;
use crate::tracing::prelude::*;

#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Load all records.
    ///
    /// A missing or malformed store yields an empty list, not an
    /// error.
    async fn load_all(&self) -> Vec<DeviceRecord>;

    /// Replace the stored list wholesale.
    async fn save_all(&self, devices: &[DeviceRecord]) -> Result<()>;
}

/// Flat JSON file store.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DeviceStore for JsonFileStore {
    async fn load_all(&self) -> Vec<DeviceRecord> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(devices) => devices,
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring malformed device store: {e}");
                Vec::new()
            }
        }
    }

    async fn save_all(&self, devices: &[DeviceRecord]) -> Result<()> {
        let json = serde_json::to_vec_pretty(devices)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceFamily, DeviceStatus, NormalizedStats};

    fn record(id: &str) -> DeviceRecord {
        DeviceRecord {
            id: id.to_string(),
            host: "192.168.1.40".to_string(),
            port: None,
            family: DeviceFamily::HttpJson,
            status: DeviceStatus::Offline,
            stats: NormalizedStats::default(),
        }
    }

    #[tokio::test]
    async fn should_round_trip_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("devices.json"));

        store.save_all(&[record("a"), record("b")]).await.unwrap();
        let loaded = store.load_all().await;

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "a");
        assert_eq!(loaded[1].id, "b");
    }

    #[tokio::test]
    async fn should_load_empty_when_store_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nonexistent.json"));

        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn should_load_empty_when_store_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let store = JsonFileStore::new(path);
        assert!(store.load_all().await.is_empty());
    }
}
