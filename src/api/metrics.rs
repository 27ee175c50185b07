//! Prometheus metrics endpoint

use axum::{routing::get, Router};
use prometheus::{Encoder, TextEncoder};

use crate::error::AppError;
use crate::metrics::REGISTRY;

/// Create metrics router
///
/// Stateless; merged after the application routes.
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// GET /metrics
async fn metrics_handler() -> Result<String, AppError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode metrics: {e}")))?;

    String::from_utf8(buffer)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("metrics are not valid UTF-8: {e}")))
}
