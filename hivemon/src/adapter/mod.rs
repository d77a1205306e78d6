//! Protocol adapters for the supported miner families.
//!
//! An adapter knows how to reach one physical device family and map its
//! native response onto [`NormalizedStats`]. Failures never cross the
//! adapter boundary as errors; they come back as offline stats with the
//! cause attached, so one unreachable device can never abort a poll
//! pass.

pub(crate) mod axe_http;
pub(crate) mod cgminer;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::device::{DeviceFamily, NormalizedStats};

pub use axe_http::AxeHttpAdapter;
pub use cgminer::CgMinerAdapter;

/// Per-device fetch timeout, shared by both families.
pub(crate) const FETCH_TIMEOUT: Duration = Duration::from_secs(3);

#[async_trait]
pub trait DeviceAdapter: Send + Sync {
    /// Fetch and normalize stats from the device at `host`.
    ///
    /// `port` of `None` selects the family default.
    async fn fetch_stats(&self, host: &str, port: Option<u16>) -> NormalizedStats;
}

/// The closed set of adapters, one instance per family.
///
/// Owned by the poller; resolving a family to its adapter is a pure
/// mapping. A `None` from [`Adapters::for_family`] means the device
/// cannot be polled and is skipped, keeping its last-known status.
pub struct Adapters {
    http_json: Arc<dyn DeviceAdapter>,
    socket_rpc: Arc<dyn DeviceAdapter>,
}

impl Adapters {
    pub fn new() -> Self {
        Self {
            http_json: Arc::new(AxeHttpAdapter::new()),
            socket_rpc: Arc::new(CgMinerAdapter),
        }
    }

    pub fn for_family(&self, family: DeviceFamily) -> Option<Arc<dyn DeviceAdapter>> {
        match family {
            DeviceFamily::HttpJson => Some(self.http_json.clone()),
            DeviceFamily::SocketRpc => Some(self.socket_rpc.clone()),
        }
    }
}

impl Default for Adapters {
    fn default() -> Self {
        Self::new()
    }
}
