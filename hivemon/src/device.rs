//! Device records and the normalized stats contract.
//!
//! These types define the API contract shared between the server and
//! clients, and double as the on-disk store format.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Miner protocol family.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Serialize,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DeviceFamily {
    /// AxeOS-style JSON API over HTTP (Bitaxe and derivatives).
    HttpJson,
    /// CGMiner RPC dialect over a raw TCP socket.
    SocketRpc,
}

/// Last-known reachability of a device.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, strum::Display, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DeviceStatus {
    Online,
    #[default]
    Offline,
}

/// One registered miner.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct DeviceRecord {
    pub id: String,
    pub host: String,
    /// Family default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub family: DeviceFamily,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(default)]
    pub stats: NormalizedStats,
}

/// Request body for registering a device.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct DeviceCreateRequest {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub family: DeviceFamily,
}

/// The stats shape every adapter maps its native response onto.
///
/// Fields a family cannot supply are zero. `hashrate_mhs` is always
/// MH/s regardless of the device's native unit.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, ToSchema)]
pub struct NormalizedStats {
    pub hashrate_mhs: f64,
    pub power_w: f64,
    pub temperature: f64,
    pub best_diff: f64,
    /// Native payload, passed through for display.
    #[schema(value_type = Object)]
    pub raw: serde_json::Value,
    pub online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for NormalizedStats {
    fn default() -> Self {
        Self {
            hashrate_mhs: 0.0,
            power_w: 0.0,
            temperature: 0.0,
            best_diff: 0.0,
            raw: serde_json::Value::Null,
            online: false,
            error: None,
        }
    }
}

impl NormalizedStats {
    /// Failure value: offline, with the cause retained for display.
    pub fn offline(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}
