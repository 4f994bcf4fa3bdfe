//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe. The gateway can always answer from bundled
/// strings when fallback is enabled; otherwise it needs the backend.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.loader.config().use_fallback {
        return StatusCode::OK;
    }

    match check_backend(&state).await {
        BackendStatus::Unreachable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    }
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let backend = check_backend(&state).await;
    let stats = state.loader.stats().await;

    let status = match backend {
        BackendStatus::Unreachable => "degraded",
        _ => "healthy",
    };

    Json(HealthResponse {
        status: status.to_string(),
        backend: backend.as_str().to_string(),
        cached_content: stats.entries,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

enum BackendStatus {
    Ok,
    Unreachable,
    NotConfigured,
}

impl BackendStatus {
    fn as_str(&self) -> &'static str {
        match self {
            BackendStatus::Ok => "ok",
            BackendStatus::Unreachable => "unreachable",
            BackendStatus::NotConfigured => "not_configured",
        }
    }
}

async fn check_backend(state: &AppState) -> BackendStatus {
    let Some(backend) = &state.backend else {
        return BackendStatus::NotConfigured;
    };

    match backend.health_check().await {
        Ok(()) => BackendStatus::Ok,
        Err(e) => {
            tracing::warn!(error = %e, "Backend health check failed");
            BackendStatus::Unreachable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
