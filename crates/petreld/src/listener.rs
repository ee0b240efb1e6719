//! Health endpoint listener.

use std::future::Future;
use std::net::SocketAddr;

use axum::Json;
use axum::routing::{Router, get};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{DaemonError, DaemonResult};

/// Create the daemon's HTTP router.
#[must_use]
pub fn create_router() -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
}

/// Liveness probe handler.
async fn healthz() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Serve the health listener until the shutdown future completes.
///
/// # Errors
///
/// Returns an error if binding to the address fails or the server
/// encounters a fatal error.
pub async fn serve_with_shutdown<F>(addr: SocketAddr, shutdown: F) -> DaemonResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| DaemonError::BindFailed(addr, e))?;

    info!(addr = %addr, "health listener listening");

    axum::serve(listener, create_router())
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| DaemonError::Internal(e.to_string()))?;

    info!("health listener shut down");
    Ok(())
}
