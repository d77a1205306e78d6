//! HTTP-JSON adapter for AxeOS-style devices.
//!
//! These devices serve a JSON stats object at a well-known path on
//! their embedded web server. Hashrate is reported in GH/s and
//! normalized to MH/s here.

use async_trait::async_trait;

use super::{DeviceAdapter, FETCH_TIMEOUT};
use crate::device::NormalizedStats;

/// Default port of the device web API.
const DEFAULT_PORT: u16 = 80;

/// Stats path served by the device firmware.
const INFO_PATH: &str = "/api/system/info";

pub struct AxeHttpAdapter {
    client: reqwest::Client,
}

impl AxeHttpAdapter {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("failed to build http client");
        Self { client }
    }
}

impl Default for AxeHttpAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceAdapter for AxeHttpAdapter {
    async fn fetch_stats(&self, host: &str, port: Option<u16>) -> NormalizedStats {
        let port = port.unwrap_or(DEFAULT_PORT);
        let url = format!("http://{host}:{port}{INFO_PATH}");

        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => return NormalizedStats::offline(e.to_string()),
        };
        let resp = match resp.error_for_status() {
            Ok(resp) => resp,
            Err(e) => return NormalizedStats::offline(e.to_string()),
        };
        let data = match resp.json::<serde_json::Value>().await {
            Ok(data) => data,
            Err(e) => return NormalizedStats::offline(format!("invalid payload: {e}")),
        };

        let hashrate_ghs = data.get("hashRate").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let power_w = data.get("power").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let temperature = data.get("temp").and_then(|v| v.as_f64()).unwrap_or(0.0);

        // Older firmware reports bestShare instead of bestDiff.
        let best_diff = data
            .get("bestDiff")
            .and_then(|v| v.as_f64())
            .filter(|d| *d != 0.0)
            .or_else(|| data.get("bestShare").and_then(|v| v.as_f64()))
            .unwrap_or(0.0);

        NormalizedStats {
            hashrate_mhs: hashrate_ghs * 1000.0,
            power_w,
            temperature,
            best_diff,
            raw: data,
            online: true,
            error: None,
        }
    }
}
