//! Response building.
//!
//! - [`operation_outcome`] - OperationOutcome generation
//! - [`bundle`] - searchset Bundle building
//! - [`format`] - FHIR JSON responses

pub mod bundle;
pub mod format;
pub mod operation_outcome;

pub use bundle::{BundleBuilder, BundleEntry, BundleLink, SearchMode};
pub use format::{FHIR_JSON, fhir_json};
pub use operation_outcome::{create_operation_outcome, deleted_outcome};
