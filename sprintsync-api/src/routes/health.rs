/// Health check and metrics endpoints
///
/// # Endpoints
///
/// - `GET /health` - service + database status
/// - `GET /metrics` - JSON snapshot of the in-memory request counters

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service name
    pub service: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,
}

/// Health check handler
///
/// Returns service health including database connectivity.
///
/// # Example
///
/// ```text
/// GET /health
/// ```
///
/// Response:
/// ```json
/// {
///   "status": "ok",
///   "service": "sprintsync",
///   "version": "1.0.0",
///   "database": "connected"
/// }
/// ```
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database_status = match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Ok(Json(HealthResponse {
        status: if database_status == "connected" {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        service: "sprintsync".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_status.to_string(),
    }))
}

/// Metrics handler
///
/// Returns the in-memory request counters as JSON.
pub async fn metrics(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.metrics.snapshot())
}
