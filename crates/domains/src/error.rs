//! # DomainError
//!
//! Centralized error handling for the Wayfarer ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed or missing input (blank fields, bounds violations, too many files)
    #[error("validation error: {0}")]
    Validation(String),

    /// Referenced entity absent (account, content record, comment, message)
    #[error("{entity} not found with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Ownership mismatch on mutation/deletion
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Credential or token failure
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Resource already exists (e.g., duplicate signup email) or wrong state
    #[error("conflict: {0}")]
    Conflict(String),

    /// No media could be pushed to the remote host
    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// Database write failed after uploads succeeded (compensation already ran)
    #[error("persistence failed: {0}")]
    PersistenceFailed(String),

    /// Infrastructure failure (DB down, media host timeout, mailer outage)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Shorthand for the common not-found case.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// A specialized Result type for Wayfarer domain logic.
pub type Result<T> = std::result::Result<T, DomainError>;
