use crate::api::AppState;
use crate::api::schemas::health::HealthResponse;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Liveness probe: returns 200 OK as long as the server is running.
pub async fn livez() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe: opens a connection with the configured credentials and runs `SELECT 1`.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    match state.health_service.check_db().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ok".into(), database: "ok".into() })),
        Err(e) => {
            tracing::warn!(error = %e, component = "database", "Readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse { status: "error".into(), database: "error".into() }),
            )
        }
    }
}
