//! Background device poller.
//!
//! Once per interval, fetches stats from every registered device
//! through its family adapter and writes the results back into the
//! registry. Fetches run concurrently and are isolated from each
//! other: a dead device only shows up as its own record going offline.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::adapter::Adapters;
use crate::device::DeviceStatus;
use crate::registry::DeviceRegistry;
use crate::tracing::prelude::*;

const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Run the poll loop until cancelled.
pub async fn task(registry: Arc<DeviceRegistry>, running: CancellationToken) {
    trace!("device poller started");

    let adapters = Adapters::new();
    let mut interval = tokio::time::interval(POLL_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = running.cancelled() => break,
            _ = interval.tick() => poll_pass(&registry, &adapters).await,
        }
    }

    trace!("device poller stopped");
}

/// One pass over every registered device.
///
/// Devices added mid-pass are picked up next tick; results for devices
/// removed mid-pass are dropped by the registry.
pub(crate) async fn poll_pass(registry: &DeviceRegistry, adapters: &Adapters) {
    let fetches = registry.list().into_iter().filter_map(|device| {
        let adapter = adapters.for_family(device.family)?;
        Some(async move {
            let stats = adapter.fetch_stats(&device.host, device.port).await;
            (device.id, stats)
        })
    });

    for (id, stats) in join_all(fetches).await {
        let status = if stats.online {
            DeviceStatus::Online
        } else {
            DeviceStatus::Offline
        };
        if !stats.online {
            debug!(id = %id, error = ?stats.error, "device offline");
        }
        registry.update(&id, status, stats);
    }
}
