//! Pieces shared by both services: serving with graceful shutdown, the
//! health endpoint, and log setup.

use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::QuizgateError;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// GET /health
pub async fn health(service: &'static str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        service: service.into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Serves `router` on `listener` until Ctrl-C.
pub(crate) async fn serve(listener: TcpListener, router: Router) -> Result<(), QuizgateError> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies.
pub fn init_tracing(default_level: &str) -> Result<(), QuizgateError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| QuizgateError::Config(format!("invalid log level: {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| QuizgateError::Config(e.to_string()))
}
