//! Crate-wide error and result types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The device store could not be read or written.
    #[error("device store error: {0}")]
    Store(#[from] std::io::Error),

    /// The device list could not be encoded for the store.
    #[error("device store encoding error: {0}")]
    StoreEncoding(#[from] serde_json::Error),

    /// Mutation request rejected before touching the registry.
    #[error("invalid device: {0}")]
    InvalidDevice(String),
}
