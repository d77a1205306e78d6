//! Typed client for the daemon API.
//!
//! Used by the CLI binary; kept alongside the server so both halves
//! share one contract.

use serde::de::DeserializeOwned;

use crate::device::{DeviceCreateRequest, DeviceFamily, DeviceRecord};
use crate::network::NetworkSnapshot;
use crate::odds::OddsReport;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:7787";

pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn list_devices(&self) -> reqwest::Result<Vec<DeviceRecord>> {
        self.get("devices").await
    }

    pub async fn add_device(
        &self,
        host: &str,
        port: Option<u16>,
        family: DeviceFamily,
    ) -> reqwest::Result<DeviceRecord> {
        let req = DeviceCreateRequest {
            host: host.to_string(),
            port,
            family,
        };
        self.http
            .post(self.url("devices"))
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    pub async fn remove_device(&self, id: &str) -> reqwest::Result<()> {
        self.http
            .delete(self.url(&format!("devices/{id}")))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn network(&self) -> reqwest::Result<NetworkSnapshot> {
        self.get("network").await
    }

    pub async fn odds(&self) -> reqwest::Result<OddsReport> {
        self.get("odds").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v0/{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> reqwest::Result<T> {
        self.http
            .get(self.url(path))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
