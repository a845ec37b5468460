//! Error types for the REST layer.
//!
//! Every error renders as an OperationOutcome with a matching HTTP status:
//!
//! | RestError | HTTP Status | FHIR Issue Code |
//! |-----------|-------------|-----------------|
//! | NotFound | 404 | not-found |
//! | InvalidRequest | 400 | invalid |
//! | NotAllowed | 405 | not-supported |
//! | Precondition | 500 | processing |
//! | Internal | 500 | exception |
//!
//! Storage errors map as follows: a missing record becomes `NotFound`;
//! dangling references, malformed search input and unsupported include
//! relationships become `InvalidRequest`; backend failures become `Internal`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use carebridge_fhir::{IssueSeverity, IssueType};
use carebridge_persistence::error::{ResourceError, StorageError};
use carebridge_translators::TranslationError;
use thiserror::Error;
use tracing::{error, warn};

use crate::responses::{create_operation_outcome, fhir_json};

/// The error type of every provider and handler operation.
#[derive(Error, Debug)]
pub enum RestError {
    /// Resource not found (HTTP 404).
    #[error("Resource {resource_type}/{id} not found")]
    NotFound { resource_type: String, id: String },

    /// Malformed or inconsistent request (HTTP 400).
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The operation is not permitted on this target (HTTP 405).
    #[error("Operation not allowed: {message}")]
    NotAllowed { message: String },

    /// An internal invariant did not hold (HTTP 500).
    #[error("Precondition failed: {message}")]
    Precondition { message: String },

    /// Unexpected failure (HTTP 500).
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Result type for REST operations.
pub type RestResult<T> = Result<T, RestError>;

impl RestError {
    pub fn not_found(resource_type: &str, id: &str) -> Self {
        RestError::NotFound {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        RestError::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn not_allowed(message: impl Into<String>) -> Self {
        RestError::NotAllowed {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        RestError::Internal {
            message: message.into(),
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::NotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            RestError::Precondition { .. } | RestError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn issue_type(&self) -> IssueType {
        match self {
            RestError::NotFound { .. } => IssueType::NotFound,
            RestError::InvalidRequest { .. } => IssueType::Invalid,
            RestError::NotAllowed { .. } => IssueType::NotSupported,
            RestError::Precondition { .. } => IssueType::Processing,
            RestError::Internal { .. } => IssueType::Exception,
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let outcome =
            create_operation_outcome(IssueSeverity::Error, self.issue_type(), &self.to_string());
        fhir_json(status, &outcome)
    }
}

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Resource(ResourceError::NotFound { record_type, id }) => {
                RestError::NotFound {
                    resource_type: record_type,
                    id,
                }
            }
            StorageError::Resource(e @ ResourceError::DanglingReference { .. }) => {
                RestError::invalid(e.to_string())
            }
            StorageError::Validation(e) => RestError::invalid(e.to_string()),
            StorageError::Search(e) => RestError::invalid(e.to_string()),
            StorageError::Backend(e) => RestError::internal(e.to_string()),
        }
    }
}

impl From<TranslationError> for RestError {
    fn from(err: TranslationError) -> Self {
        match err {
            TranslationError::Precondition { message } => RestError::Precondition { message },
            TranslationError::Storage(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebridge_persistence::error::{BackendError, SearchError, ValidationError};

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RestError::not_found("EpisodeOfCare", "1").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(RestError::invalid("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RestError::not_allowed("x").status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            RestError::Precondition {
                message: "x".to_string()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RestError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_storage_error_mapping() {
        let err: RestError = StorageError::not_found("Enrollment", "e1").into();
        assert!(matches!(err, RestError::NotFound { ref id, .. } if id == "e1"));

        let err: RestError = StorageError::from(ValidationError::InvalidSearchParameter {
            parameter: "date".to_string(),
            message: "bad".to_string(),
        })
        .into();
        assert!(matches!(err, RestError::InvalidRequest { .. }));

        let err: RestError = StorageError::from(SearchError::UnsupportedRelationship {
            operation: "_include".to_string(),
            relationship: "Patient:general-practitioner".to_string(),
        })
        .into();
        assert!(matches!(err, RestError::InvalidRequest { .. }));

        let err: RestError = StorageError::from(ResourceError::DanglingReference {
            record_type: "Enrollment".to_string(),
            id: "e1".to_string(),
            target_type: "Person".to_string(),
            target_id: "p9".to_string(),
        })
        .into();
        assert!(matches!(err, RestError::InvalidRequest { .. }));

        let err: RestError = StorageError::from(BackendError::QueryError {
            message: "boom".to_string(),
        })
        .into();
        assert!(matches!(err, RestError::Internal { .. }));
    }

    #[test]
    fn test_translation_error_mapping() {
        let err: RestError = TranslationError::precondition("no identity").into();
        assert!(matches!(err, RestError::Precondition { .. }));

        let err: RestError =
            TranslationError::from(StorageError::not_found("Person", "p1")).into();
        assert!(matches!(err, RestError::NotFound { .. }));
    }
}
