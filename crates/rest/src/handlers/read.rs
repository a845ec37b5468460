//! Read interaction handlers.
//!
//! `GET [base]/EpisodeOfCare/[id]` and `GET [base]/Patient/[id]`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tracing::debug;

use crate::error::RestResult;
use crate::responses::fhir_json;
use crate::state::AppState;

/// Reads one EpisodeOfCare.
///
/// # Response
///
/// - `200 OK` - the resource
/// - `404 Not Found` - unknown or deleted
pub async fn read_episode_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> RestResult<Response> {
    debug!(id = %id, "Processing EpisodeOfCare read request");

    let episode = state
        .run_blocking(move |providers| providers.episodes.get(&id))
        .await?;
    Ok(fhir_json(StatusCode::OK, &episode))
}

/// Reads one Patient.
pub async fn read_patient_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> RestResult<Response> {
    debug!(id = %id, "Processing Patient read request");

    let patient = state
        .run_blocking(move |providers| providers.patients.get(&id))
        .await?;
    Ok(fhir_json(StatusCode::OK, &patient))
}
