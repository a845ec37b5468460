//! # carebridge-translators
//!
//! Bidirectional translation between the internal records of
//! [`carebridge_persistence::model`] and the FHIR resources of
//! [`carebridge_fhir`].
//!
//! Every translator implements [`ResourceTranslator`]. Composite translators
//! take their collaborators as trait objects at construction and hold no
//! other state, so one instance can be shared across requests.
//!
//! - [`EpisodeOfCareTranslator`] - enrollment records as `EpisodeOfCare`
//! - [`PersonTranslator`] - persons as `Patient`
//! - [`PatientReferenceTranslator`] / [`ConceptTranslator`] - the
//!   sub-translators for references and coded concepts
//! - [`CodingPreferenceResolver`] - picks one coding out of a concept
//! - [`PeriodTranslator`] - timestamp pairs as `Period`

pub mod coding;
pub mod concept;
pub mod episode_of_care;
pub mod error;
pub mod patient_reference;
pub mod period;
pub mod person;

pub use coding::CodingPreferenceResolver;
pub use concept::{ConceptTranslator, RepositoryConceptTranslator};
pub use episode_of_care::EpisodeOfCareTranslator;
pub use error::{TranslationError, TranslationResult};
pub use patient_reference::{PatientReferenceTranslator, RepositoryPatientReferenceTranslator};
pub use period::PeriodTranslator;
pub use person::PersonTranslator;

/// Translation between an internal record and an external resource.
pub trait ResourceTranslator<R, F>: Send + Sync {
    /// Builds the external form of `record`.
    fn to_resource(&self, record: &R) -> TranslationResult<F>;

    /// Builds a fresh record from `resource`.
    fn to_record(&self, resource: &F) -> TranslationResult<R>;

    /// Writes the fields `resource` carries into an existing record.
    ///
    /// On error `existing` is left as it was.
    fn merge_into(&self, existing: &mut R, resource: &F) -> TranslationResult<()>;
}
