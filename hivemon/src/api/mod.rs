//! HTTP API server.
//!
//! Serves the dashboard-facing read/write surface over the core:
//! device listing and mutation, the cached network snapshot, and the
//! odds report.

pub mod v0;

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::network::NetworkSnapshot;
use crate::registry::DeviceRegistry;
use crate::tracing::prelude::*;

/// State shared by all API handlers.
#[derive(Clone)]
pub struct SharedState {
    pub registry: Arc<DeviceRegistry>,
    pub network_rx: watch::Receiver<NetworkSnapshot>,
}

#[derive(OpenApi)]
#[openapi(info(title = "hivemon API", description = "Mining fleet monitor API"))]
struct ApiDoc;

/// Build the application router.
pub fn router(state: SharedState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/v0", v0::routes())
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api/v0/openapi.json", api))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until the token is cancelled.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: SharedState,
    running: CancellationToken,
) -> std::io::Result<()> {
    info!("API listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { running.cancelled().await })
        .await
}
