//! # carebridge-fhir
//!
//! The external, FHIR-shaped resource model exposed by CareBridge.
//!
//! Only the resources and datatypes the server actually translates are
//! modelled: [`EpisodeOfCare`], [`Patient`] and [`OperationOutcome`], plus the
//! datatypes they are built from. All types map to FHIR JSON through serde.

pub mod datatypes;
pub mod episode_of_care;
pub mod operation_outcome;
pub mod patient;
pub mod serde_helpers;

pub use datatypes::{Address, CodeableConcept, Coding, HumanName, Identifier, Period, Reference};
pub use episode_of_care::{EpisodeCategory, EpisodeOfCare, EpisodeOfCareStatus};
pub use operation_outcome::{IssueSeverity, IssueType, OperationOutcome, OperationOutcomeIssue};
pub use patient::{Meta, Patient};

/// Well-known terminology system URIs.
pub mod systems {
    pub const SNOMED_CT: &str = "http://snomed.info/sct";
    pub const RXNORM: &str = "http://www.nlm.nih.gov/research/umls/rxnorm";
    pub const LOINC: &str = "http://loinc.org";
}
