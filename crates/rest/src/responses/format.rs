//! FHIR JSON response formatting.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::{HeaderValue, StatusCode, header};
use serde::Serialize;

/// Media type of every resource response.
pub const FHIR_JSON: &str = "application/fhir+json";

/// Serializes `body` as a FHIR JSON response.
pub fn fhir_json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(FHIR_JSON))],
        Json(body),
    )
        .into_response()
}
