use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

/// Liveness check; also reports whether a scan or print is in flight.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "up",
        "version": env!("CARGO_PKG_VERSION"),
        "warehouse": state.config.warehouse,
        "busy": state.busy.is_busy(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
