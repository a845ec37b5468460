//! Create interaction handler.
//!
//! `POST [base]/EpisodeOfCare`

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use carebridge_fhir::EpisodeOfCare;
use tracing::debug;

use crate::error::RestResult;
use crate::extractors::FhirResource;
use crate::responses::fhir_json;
use crate::state::AppState;

/// Creates an EpisodeOfCare under a server-assigned id.
///
/// # Response
///
/// - `201 Created` - the stored resource, with a `Location` header
/// - `400 Bad Request` - malformed body or wrong `resourceType`
pub async fn create_episode_handler(
    State(state): State<AppState>,
    FhirResource(episode): FhirResource<EpisodeOfCare>,
) -> RestResult<Response> {
    debug!(client_id = ?episode.id, "Processing EpisodeOfCare create request");

    let created = state
        .run_blocking(move |providers| providers.episodes.create(&episode))
        .await?;

    let mut response = fhir_json(StatusCode::CREATED, &created);
    let location = format!(
        "{}/{}/{}",
        state.config().base_url.trim_end_matches('/'),
        EpisodeOfCare::RESOURCE_TYPE,
        created.id.as_deref().unwrap_or_default()
    );
    if let Ok(value) = HeaderValue::from_str(&location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}
