//! API v0 endpoints.
//!
//! Version 0 signals an unstable API -- breaking changes are expected
//! until the monitor reaches 1.0.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::SharedState;
use crate::device::{DeviceCreateRequest, DeviceRecord};
use crate::error::Error;
use crate::network::NetworkSnapshot;
use crate::odds::{self, OddsReport};

/// Build the v0 API routes with OpenAPI metadata.
pub fn routes() -> OpenApiRouter<SharedState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .routes(routes!(list_devices, add_device))
        .routes(routes!(remove_device))
        .routes(routes!(get_network))
        .routes(routes!(get_odds))
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = OK, description = "Server is running", body = String),
    ),
)]
async fn health() -> &'static str {
    "OK"
}

/// Return all registered devices with their last-known stats.
#[utoipa::path(
    get,
    path = "/devices",
    tag = "devices",
    responses(
        (status = OK, description = "List of registered devices", body = Vec<DeviceRecord>),
    ),
)]
async fn list_devices(State(state): State<SharedState>) -> Json<Vec<DeviceRecord>> {
    Json(state.registry.list())
}

/// Register a device.
#[utoipa::path(
    post,
    path = "/devices",
    tag = "devices",
    request_body = DeviceCreateRequest,
    responses(
        (status = OK, description = "Created device", body = DeviceRecord),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid device request"),
        (status = INTERNAL_SERVER_ERROR, description = "Device store write failed"),
    ),
)]
async fn add_device(
    State(state): State<SharedState>,
    Json(req): Json<DeviceCreateRequest>,
) -> Result<Json<DeviceRecord>, StatusCode> {
    state
        .registry
        .add(&req.host, req.port, req.family)
        .await
        .map(Json)
        .map_err(|e| match e {
            Error::InvalidDevice(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        })
}

/// Remove a device. Unknown ids are a no-op.
#[utoipa::path(
    delete,
    path = "/devices/{id}",
    tag = "devices",
    params(
        ("id" = String, Path, description = "Device id"),
    ),
    responses(
        (status = NO_CONTENT, description = "Device removed (or was never registered)"),
        (status = INTERNAL_SERVER_ERROR, description = "Device store write failed"),
    ),
)]
async fn remove_device(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    state
        .registry
        .remove(&id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Return the cached network snapshot.
///
/// All-zero until the first successful fetch pass.
#[utoipa::path(
    get,
    path = "/network",
    tag = "network",
    responses(
        (status = OK, description = "Cached network snapshot", body = NetworkSnapshot),
    ),
)]
async fn get_network(State(state): State<SharedState>) -> Json<NetworkSnapshot> {
    Json(state.network_rx.borrow().clone())
}

/// Compute block-finding odds for the fleet.
#[utoipa::path(
    get,
    path = "/odds",
    tag = "odds",
    responses(
        (status = OK, description = "Odds report", body = OddsReport),
        (status = SERVICE_UNAVAILABLE, description = "No network data cached yet"),
    ),
)]
async fn get_odds(State(state): State<SharedState>) -> Result<Json<OddsReport>, StatusCode> {
    let difficulty = state.network_rx.borrow().difficulty;
    let total_mhs = state.registry.online_hashrate_mhs();

    odds::calculate(total_mhs, difficulty)
        .map(Json)
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use tokio::sync::watch;
    use tower::ServiceExt;

    use super::*;
    use crate::registry::DeviceRegistry;
    use crate::store::testing::MemStore;

    fn app(snapshot: NetworkSnapshot) -> axum::Router {
        let registry = Arc::new(DeviceRegistry::new(Arc::new(MemStore::default())));
        let (_tx, network_rx) = watch::channel(snapshot);
        crate::api::router(SharedState {
            registry,
            network_rx,
        })
    }

    fn post_device(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v0/devices")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_list_no_devices_initially() {
        let app = app(NetworkSnapshot::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v0/devices")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn should_add_then_remove_device() {
        let app = app(NetworkSnapshot::default());

        let response = app
            .clone()
            .oneshot(post_device(
                r#"{"host": "192.168.1.40", "family": "http-json"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let created = json_body(response).await;
        assert_eq!(created["host"], "192.168.1.40");
        assert_eq!(created["status"], "offline");
        let id = created["id"].as_str().unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v0/devices/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn should_reject_unknown_family() {
        let app = app(NetworkSnapshot::default());

        let response = app
            .oneshot(post_device(
                r#"{"host": "192.168.1.40", "family": "antminer"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn should_reject_empty_host() {
        let app = app(NetworkSnapshot::default());

        let response = app
            .oneshot(post_device(r#"{"host": "  ", "family": "socket-rpc"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn should_return_zero_snapshot_before_first_fetch() {
        let app = app(NetworkSnapshot::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v0/network")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["block_height"], 0);
        assert_eq!(body["difficulty"], 0.0);
    }

    #[tokio::test]
    async fn should_refuse_odds_without_network_data() {
        let app = app(NetworkSnapshot::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v0/odds")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn should_serve_odds_once_difficulty_is_cached() {
        let app = app(NetworkSnapshot {
            difficulty: 9.0e13,
            ..NetworkSnapshot::default()
        });

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v0/odds")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        // No devices online yet: defined, but zero.
        assert_eq!(body["time_to_block_secs"], 0.0);
        assert_eq!(body["lottery"]["comparison"], "Start mining to compare!");
    }
}
