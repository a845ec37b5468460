//! Error types for translation.

use carebridge_persistence::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslationError {
    /// A required input was missing, e.g. a record without an identity.
    #[error("translation precondition failed: {message}")]
    Precondition { message: String },

    /// A lookup needed by the translation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TranslationError {
    pub fn precondition(message: impl Into<String>) -> Self {
        TranslationError::Precondition {
            message: message.into(),
        }
    }
}

pub type TranslationResult<T> = Result<T, TranslationError>;
