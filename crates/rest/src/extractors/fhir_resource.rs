//! FHIR resource body extractor.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use carebridge_fhir::{EpisodeOfCare, Patient};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::RestError;

/// A resource type the server accepts in request bodies.
pub trait FhirResourceType: DeserializeOwned {
    const RESOURCE_TYPE: &'static str;
}

impl FhirResourceType for EpisodeOfCare {
    const RESOURCE_TYPE: &'static str = EpisodeOfCare::RESOURCE_TYPE;
}

impl FhirResourceType for Patient {
    const RESOURCE_TYPE: &'static str = Patient::RESOURCE_TYPE;
}

/// Axum extractor for a typed FHIR JSON body.
///
/// The body must be a JSON object whose `resourceType` names `T`.
#[derive(Debug)]
pub struct FhirResource<T>(pub T);

impl<T: FhirResourceType> FhirResource<T> {
    /// Parses and checks a raw body.
    pub fn parse(body: &[u8]) -> Result<T, RestError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| RestError::invalid(format!("Invalid JSON: {}", e)))?;

        match value.get("resourceType").and_then(Value::as_str) {
            Some(rt) if rt == T::RESOURCE_TYPE => {}
            Some(rt) => {
                return Err(RestError::invalid(format!(
                    "Expected resourceType {}, found {}",
                    T::RESOURCE_TYPE,
                    rt
                )));
            }
            None => return Err(RestError::invalid("Resource must contain resourceType")),
        }

        serde_json::from_value(value)
            .map_err(|e| RestError::invalid(format!("Invalid {}: {}", T::RESOURCE_TYPE, e)))
    }
}

impl<S, T> FromRequest<S> for FhirResource<T>
where
    S: Send + Sync,
    T: FhirResourceType,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| RestError::invalid(format!("Failed to read body: {}", e)))?;
        Self::parse(&body).map(FhirResource)
    }
}
