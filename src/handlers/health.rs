//! Health check endpoint for service monitoring.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::DbPool;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: &'static str,

    /// "connected" or "unreachable"
    pub database: &'static str,

    pub version: &'static str,

    pub timestamp: DateTime<Utc>,
}

/// Health check handler. Public: no API key required.
///
/// Returns 200 when the database answers `SELECT 1`, otherwise 503 with
/// `"status": "degraded"`.
pub async fn health_check(State(pool): State<DbPool>) -> (StatusCode, Json<HealthResponse>) {
    let (status_code, status, database) = match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => (StatusCode::OK, "healthy", "connected"),
        Err(err) => {
            tracing::error!(error = %err, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unreachable")
        }
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            database,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
        }),
    )
}
