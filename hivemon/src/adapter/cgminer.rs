//! CGMiner-dialect RPC adapter.
//!
//! The protocol is a single JSON command written to a raw TCP socket
//! with no framing. Replies carry no length prefix either: the stream
//! either closes after the reply, or the accumulated buffer ends with
//! a closing brace. Some firmwares pad the reply with NUL bytes, which
//! must be stripped before parsing.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use async_trait::async_trait;

use super::{DeviceAdapter, FETCH_TIMEOUT};
use crate::device::NormalizedStats;

/// Default CGMiner API port.
const DEFAULT_PORT: u16 = 4028;

const SUMMARY_COMMAND: &[u8] = br#"{"command": "summary"}"#;

const READ_CHUNK: usize = 4096;

#[derive(Debug, thiserror::Error)]
enum RpcError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no SUMMARY section in reply")]
    MissingSummary,
}

pub struct CgMinerAdapter;

impl CgMinerAdapter {
    /// Issue the summary command over a blocking socket.
    ///
    /// Runs on the caller's thread; the async wrapper moves it off the
    /// runtime via `spawn_blocking`.
    fn summary_blocking(host: &str, port: u16) -> Result<serde_json::Value, RpcError> {
        let addr = (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no address for host")
        })?;

        let mut stream = TcpStream::connect_timeout(&addr, FETCH_TIMEOUT)?;
        stream.set_read_timeout(Some(FETCH_TIMEOUT))?;
        stream.set_write_timeout(Some(FETCH_TIMEOUT))?;
        stream.write_all(SUMMARY_COMMAND)?;

        let mut buf = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = stream.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if ends_with_closing_brace(&buf) {
                break;
            }
        }

        buf.retain(|b| *b != 0);
        Ok(serde_json::from_slice(&buf)?)
    }
}

/// End-of-reply heuristic: the trimmed buffer ends with `}`.
///
/// NUL padding and trailing whitespace are ignored in the scan.
fn ends_with_closing_brace(buf: &[u8]) -> bool {
    buf.iter()
        .rev()
        .find(|b| !b.is_ascii_whitespace() && **b != 0)
        .is_some_and(|b| *b == b'}')
}

#[async_trait]
impl DeviceAdapter for CgMinerAdapter {
    async fn fetch_stats(&self, host: &str, port: Option<u16>) -> NormalizedStats {
        let host = host.to_string();
        let port = port.unwrap_or(DEFAULT_PORT);

        let reply =
            tokio::task::spawn_blocking(move || Self::summary_blocking(&host, port)).await;

        let reply = match reply {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => return NormalizedStats::offline(e.to_string()),
            Err(e) => return NormalizedStats::offline(format!("fetch task failed: {e}")),
        };

        let Some(summary) = reply.get("SUMMARY").and_then(|s| s.get(0)) else {
            return NormalizedStats::offline(RpcError::MissingSummary.to_string());
        };

        NormalizedStats {
            hashrate_mhs: summary
                .get("MHS 5s")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
            // Not reliably reported by this dialect's summary reply.
            power_w: 0.0,
            temperature: summary
                .get("Temperature")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
            best_diff: summary
                .get("Best Share")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
            raw: summary.clone(),
            online: true,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Accept one connection, read the command, send `reply`, close.
    async fn serve_reply(reply: Vec<u8>) -> u16 {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut cmd = [0u8; 256];
            let _ = socket.read(&mut cmd).await.unwrap();
            socket.write_all(&reply).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        port
    }

    #[tokio::test]
    async fn should_parse_summary_reply_with_nul_bytes() {
        let mut reply =
            br#"{"SUMMARY": [{"MHS 5s": 120, "Temperature": 55, "Best Share": 10}]}"#.to_vec();
        reply.insert(10, 0);
        reply.push(0);
        let port = serve_reply(reply).await;

        let stats = CgMinerAdapter.fetch_stats("127.0.0.1", Some(port)).await;

        assert!(stats.online);
        assert_eq!(stats.hashrate_mhs, 120.0);
        assert_eq!(stats.temperature, 55.0);
        assert_eq!(stats.best_diff, 10.0);
        assert_eq!(stats.power_w, 0.0);
        assert!(stats.error.is_none());
    }

    #[tokio::test]
    async fn should_mark_offline_when_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let stats = CgMinerAdapter.fetch_stats("127.0.0.1", Some(port)).await;

        assert!(!stats.online);
        assert!(!stats.error.as_deref().unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn should_mark_offline_when_summary_missing() {
        let port = serve_reply(br#"{"STATUS": [{"Msg": "Summary"}]}"#.to_vec()).await;

        let stats = CgMinerAdapter.fetch_stats("127.0.0.1", Some(port)).await;

        assert!(!stats.online);
        assert_eq!(stats.error.as_deref(), Some("no SUMMARY section in reply"));
    }

    #[tokio::test]
    async fn should_mark_offline_on_unparseable_reply() {
        let port = serve_reply(b"not json at all}".to_vec()).await;

        let stats = CgMinerAdapter.fetch_stats("127.0.0.1", Some(port)).await;

        assert!(!stats.online);
        assert!(
            stats
                .error
                .as_deref()
                .unwrap_or_default()
                .starts_with("invalid payload")
        );
    }

    #[test]
    fn should_detect_end_of_reply_through_padding() {
        assert!(ends_with_closing_brace(b"{\"a\": 1}"));
        assert!(ends_with_closing_brace(b"{\"a\": 1}\n  "));
        assert!(ends_with_closing_brace(b"{\"a\": 1}\0\0"));
        assert!(!ends_with_closing_brace(b"{\"a\": 1"));
        assert!(!ends_with_closing_brace(b""));
    }
}
