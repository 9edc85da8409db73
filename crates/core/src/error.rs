//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Illegal move in a lifecycle state machine.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum StateViolation {
    #[error("report already submitted")]
    AlreadySubmitted,

    #[error("report must be submitted first")]
    MustBeSubmittedFirst,

    #[error("cannot edit approved reports")]
    CannotEditApproved,

    #[error("can only edit draft reports")]
    CanOnlyEditDraft,

    #[error("can only delete draft reports")]
    CanOnlyDeleteDraft,
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Anything the
/// store cannot classify travels as `Internal`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The entity does not exist, or belongs to another tenant.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Authenticated, but not allowed to perform the operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The entity is not in a state that permits the operation.
    #[error("invalid state: {0}")]
    InvalidState(StateViolation),

    /// A unique key is already taken (email, phone, subdomain, ...).
    #[error("{0} already exists")]
    DuplicateKey(&'static str),

    /// A conflict occurred (e.g. stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Opaque persistence failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound(entity)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<StateViolation> for DomainError {
    fn from(value: StateViolation) -> Self {
        Self::InvalidState(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_entity() {
        assert_eq!(DomainError::not_found("taxi").to_string(), "taxi not found");
        assert_eq!(DomainError::DuplicateKey("email").to_string(), "email already exists");
    }

    #[test]
    fn state_violation_converts() {
        let err: DomainError = StateViolation::AlreadySubmitted.into();
        assert_eq!(err, DomainError::InvalidState(StateViolation::AlreadySubmitted));
        assert_eq!(err.to_string(), "invalid state: report already submitted");
    }
}
