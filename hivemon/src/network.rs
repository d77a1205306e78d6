//! Network-wide metrics: cached snapshot and background fetcher.
//!
//! The fetcher publishes a complete snapshot or nothing. A failed
//! sub-fetch discards the whole tick, so readers either see the
//! previous snapshot or the new one, never a torn mix of fields.

use std::num::ParseIntError;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

use crate::tracing::prelude::*;

const FETCH_INTERVAL: Duration = Duration::from_secs(60);
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Recommended fee tiers in sat/vByte.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeEstimates {
    pub fastest_fee: u64,
    pub half_hour_fee: u64,
    pub hour_fee: u64,
    #[serde(default)]
    pub economy_fee: u64,
    #[serde(default)]
    pub minimum_fee: u64,
}

/// One consistent view of the network, replaced wholesale each tick.
///
/// All fields come from the same fetch pass; the default value stands
/// in until the first pass succeeds.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, ToSchema)]
pub struct NetworkSnapshot {
    pub price_usd: f64,
    pub block_height: u64,
    pub fees: FeeEstimates,
    pub difficulty: f64,
    pub mempool_tx_count: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("unparseable block height: {0}")]
    BadHeight(#[from] ParseIntError),
}

/// Periodic fetcher for the five network metrics.
pub struct NetworkFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl NetworkFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("failed to build http client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Run the fetch loop until cancelled, publishing into `tx`.
    pub async fn run(self, tx: watch::Sender<NetworkSnapshot>, running: CancellationToken) {
        trace!("network fetcher started");

        let mut interval = tokio::time::interval(FETCH_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = running.cancelled() => break,
                _ = interval.tick() => self.tick(&tx).await,
            }
        }

        trace!("network fetcher stopped");
    }

    /// One fetch tick: publish a full snapshot or keep the old one.
    pub(crate) async fn tick(&self, tx: &watch::Sender<NetworkSnapshot>) {
        match self.fetch_snapshot().await {
            Ok(snapshot) => {
                debug!(
                    height = snapshot.block_height,
                    difficulty = snapshot.difficulty,
                    "network snapshot updated"
                );
                tx.send_replace(snapshot);
            }
            Err(e) => warn!("network fetch failed, keeping previous snapshot: {e}"),
        }
    }

    /// Fetch all five metrics; any failure fails the whole set.
    pub async fn fetch_snapshot(&self) -> Result<NetworkSnapshot, FetchError> {
        let (price_usd, block_height, fees, mempool_tx_count, difficulty) = tokio::try_join!(
            self.price_usd(),
            self.block_height(),
            self.fees(),
            self.mempool_tx_count(),
            self.difficulty(),
        )?;

        Ok(NetworkSnapshot {
            price_usd,
            block_height,
            fees,
            difficulty,
            mempool_tx_count,
        })
    }

    async fn price_usd(&self) -> Result<f64, FetchError> {
        #[derive(Deserialize)]
        struct Prices {
            #[serde(rename = "USD")]
            usd: f64,
        }

        let prices: Prices = self.get_json("/api/v1/prices").await?;
        Ok(prices.usd)
    }

    async fn block_height(&self) -> Result<u64, FetchError> {
        // Served as a bare integer in a text body.
        let text = self
            .client
            .get(format!("{}/api/blocks/tip/height", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text.trim().parse()?)
    }

    async fn fees(&self) -> Result<FeeEstimates, FetchError> {
        self.get_json("/api/v1/fees/recommended").await
    }

    async fn mempool_tx_count(&self) -> Result<u64, FetchError> {
        #[derive(Deserialize)]
        struct Mempool {
            count: u64,
        }

        let mempool: Mempool = self.get_json("/api/mempool").await?;
        Ok(mempool.count)
    }

    async fn difficulty(&self) -> Result<f64, FetchError> {
        #[derive(Deserialize)]
        struct DifficultyAdjustment {
            // Some deployments omit the field; the upstream dashboard
            // treats that as difficulty 1.
            #[serde(default = "default_difficulty")]
            difficulty: f64,
        }

        let adjustment: DifficultyAdjustment =
            self.get_json("/api/v1/difficulty-adjustment").await?;
        Ok(adjustment.difficulty)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}

fn default_difficulty() -> f64 {
    1.0
}
