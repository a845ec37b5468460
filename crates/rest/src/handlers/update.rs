//! Update interaction handlers.
//!
//! `PUT [base]/EpisodeOfCare/[id]`, plus `PUT [base]/EpisodeOfCare`, which
//! is always rejected for lacking an id.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use carebridge_fhir::EpisodeOfCare;
use tracing::debug;

use crate::error::RestResult;
use crate::extractors::FhirResource;
use crate::responses::fhir_json;
use crate::state::AppState;

/// Updates an existing EpisodeOfCare.
///
/// # Response
///
/// - `200 OK` - the stored resource
/// - `400 Bad Request` - the body id differs from the path id
/// - `405 Method Not Allowed` - no such episode; update never creates
pub async fn update_episode_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FhirResource(episode): FhirResource<EpisodeOfCare>,
) -> RestResult<Response> {
    debug!(id = %id, "Processing EpisodeOfCare update request");

    let updated = state
        .run_blocking(move |providers| providers.episodes.update(Some(&id), &episode))
        .await?;
    Ok(fhir_json(StatusCode::OK, &updated))
}

/// Update without an id in the path.
pub async fn update_episode_without_id_handler(
    State(state): State<AppState>,
    FhirResource(episode): FhirResource<EpisodeOfCare>,
) -> RestResult<Response> {
    debug!("Processing EpisodeOfCare update request without id");

    let updated = state
        .run_blocking(move |providers| providers.episodes.update(None, &episode))
        .await?;
    Ok(fhir_json(StatusCode::OK, &updated))
}
