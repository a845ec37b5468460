//! Axum extractors for FHIR requests.
//!
//! - [`FhirResource`] - typed, checked resource bodies
//! - [`SearchParams`] - search query strings as a `SearchParameterMap`

mod fhir_resource;
mod search_params;

pub use fhir_resource::{FhirResource, FhirResourceType};
pub use search_params::SearchParams;
