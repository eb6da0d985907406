//! Store error types
//!
//! This module defines the errors the document store can raise during
//! reads and batch commits, and the mapping into the port error the
//! domain layer consumes.

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur inside the document store
///
/// Conflict-class variants (duplicate key, version mismatch, vanished
/// row) all mean the same thing to a caller: the batch was planned
/// against a snapshot that is no longer current.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document not found in the store
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: String, id: String },

    /// Unique key violation on (enrollment, month)
    #[error("duplicate settlement: {0}")]
    DuplicateKey(String),

    /// Update staged against a version that is no longer current
    #[error("version conflict: {0}")]
    VersionConflict(String),

    /// Update or delete target disappeared between snapshot and commit
    #[error("write target vanished: {0}")]
    MissingRow(String),

    /// A commit exceeded the configured write timeout
    #[error("store operation '{operation}' timed out after {elapsed_ms}ms")]
    Timeout { operation: String, elapsed_ms: u64 },
}

impl StoreError {
    /// Creates a not found error for a specific entity type and identifier
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        StoreError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn duplicate_key(message: impl Into<String>) -> Self {
        StoreError::DuplicateKey(message.into())
    }

    pub fn version_conflict(message: impl Into<String>) -> Self {
        StoreError::VersionConflict(message.into())
    }

    pub fn missing_row(message: impl Into<String>) -> Self {
        StoreError::MissingRow(message.into())
    }

    pub fn timeout(operation: impl Into<String>, elapsed_ms: u64) -> Self {
        StoreError::Timeout {
            operation: operation.into(),
            elapsed_ms,
        }
    }

    /// Checks if this error indicates a document was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Checks if this error means the caller's snapshot went stale
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::DuplicateKey(_)
                | StoreError::VersionConflict(_)
                | StoreError::MissingRow(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, StoreError::Timeout { .. })
    }
}

/// Maps store failures onto the port error surface the domain sees
impl From<StoreError> for PortError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { entity, id } => PortError::not_found(entity, id),
            StoreError::Timeout {
                operation,
                elapsed_ms,
            } => PortError::timeout(operation, elapsed_ms),
            conflict => PortError::conflict(conflict.to_string()),
        }
    }
}
