//! Delete interaction handler.
//!
//! `DELETE [base]/EpisodeOfCare/[id]`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tracing::debug;

use crate::error::RestResult;
use crate::responses::fhir_json;
use crate::state::AppState;

/// Deletes (voids) an EpisodeOfCare.
///
/// Always answers `200 OK` with the same informational OperationOutcome,
/// including for repeated deletes and unknown ids.
pub async fn delete_episode_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> RestResult<Response> {
    debug!(id = %id, "Processing EpisodeOfCare delete request");

    let outcome = state
        .run_blocking(move |providers| providers.episodes.delete(&id))
        .await?;
    Ok(fhir_json(StatusCode::OK, &outcome))
}
