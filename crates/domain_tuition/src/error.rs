//! Tuition domain errors

use core_kernel::{MoneyError, MonthError, PortError};
use thiserror::Error;

/// Errors that can occur in the tuition domain
#[derive(Debug, Error)]
pub enum TuitionError {
    /// Input failed validation and the request was never processed
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Concurrent writes collided and retries were exhausted
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Money arithmetic failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Billing month arithmetic failed
    #[error("Month error: {0}")]
    Month(#[from] MonthError),

    /// The backing store failed
    #[error("Store error: {0}")]
    Store(#[source] PortError),
}

impl TuitionError {
    pub fn validation(message: impl Into<String>) -> Self {
        TuitionError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        TuitionError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        TuitionError::Conflict(message.into())
    }

    /// Returns true if the caller may retry the request as-is
    pub fn is_retryable(&self) -> bool {
        match self {
            TuitionError::Conflict(_) => true,
            TuitionError::Store(port) => port.is_transient(),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TuitionError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TuitionError::Validation(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, TuitionError::Conflict(_))
    }
}

impl From<PortError> for TuitionError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                TuitionError::NotFound(format!("{} with id {}", entity_type, id))
            }
            PortError::Validation { message, .. } => TuitionError::Validation(message),
            PortError::Conflict { message } => TuitionError::Conflict(message),
            other => TuitionError::Store(other),
        }
    }
}
