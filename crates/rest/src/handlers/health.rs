//! Health check endpoint handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::state::AppState;

/// Reports whether the record store is reachable.
///
/// # HTTP Request
///
/// `GET [base]/health`
///
/// # Response
///
/// - `200 OK` - Server is healthy
/// - `503 Service Unavailable` - the store cannot be reached
pub async fn health_handler(State(state): State<AppState>) -> Response {
    debug!("Processing health check request");

    let store = state.store().clone();
    let backend_name = store.backend_name();
    let check = tokio::task::spawn_blocking(move || store.health_check()).await;

    let (status, health) = match check {
        Ok(Ok(())) => (StatusCode::OK, "healthy"),
        Ok(Err(e)) => {
            warn!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
        Err(e) => {
            warn!(error = %e, "Health check task failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };

    let body = serde_json::json!({
        "status": health,
        "backend": backend_name,
        "timestamp": chrono::Utc::now().to_rfc3339()
    });
    (status, Json(body)).into_response()
}
