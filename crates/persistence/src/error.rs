//! Error types for the persistence layer.
//!
//! Errors are grouped by category: record state, validation of incoming
//! search input, search execution, and backend failures.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Record state errors
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Search operation errors
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors related to record state.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The requested record was not found.
    #[error("record not found: {record_type}/{id}")]
    NotFound { record_type: String, id: String },

    /// A record refers to another record that is not stored.
    #[error("{record_type}/{id} refers to missing {target_type}/{target_id}")]
    DanglingReference {
        record_type: String,
        id: String,
        target_type: String,
        target_id: String,
    },
}

/// Errors related to malformed input.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The search parameter is invalid.
    #[error("invalid search parameter {parameter}: {message}")]
    InvalidSearchParameter { parameter: String, message: String },

    /// Missing required field.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },
}

/// Errors related to search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The include relationship is not known for the searched type.
    #[error("unsupported {operation} relationship: {relationship}")]
    UnsupportedRelationship {
        operation: String,
        relationship: String,
    },
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Schema migration error.
    #[error("schema migration failed: {message}")]
    MigrationError { message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// A stored value could not be decoded.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Shorthand for a missing record.
    pub fn not_found(record_type: &str, id: &str) -> Self {
        StorageError::Resource(ResourceError::NotFound {
            record_type: record_type.to_string(),
            id: id.to_string(),
        })
    }

    /// True when the error reports a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Resource(ResourceError::NotFound { .. }))
    }
}
