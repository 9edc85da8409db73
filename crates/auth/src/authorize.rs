use thiserror::Error;

use crate::permissions::{Permission, PermissionMask};
use crate::principal::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Require a single permission bit.
///
/// - No IO
/// - No panics
/// - Tenant scoping is the caller's job and happens first
pub fn authorize(mask: PermissionMask, required: Permission) -> Result<(), AuthzError> {
    if mask.has(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Require at least one of `required`.
pub fn authorize_any(mask: PermissionMask, required: &[Permission]) -> Result<(), AuthzError> {
    if mask.has_any(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(join(required, " | ")))
    }
}

/// Require every one of `required`.
pub fn authorize_all(mask: PermissionMask, required: &[Permission]) -> Result<(), AuthzError> {
    if mask.has_all(required) {
        Ok(())
    } else {
        let missing: Vec<Permission> = required.iter().copied().filter(|p| !mask.has(*p)).collect();
        Err(AuthzError::Forbidden(join(&missing, " & ")))
    }
}

/// Absence of a validated principal is `Unauthenticated`, not `Forbidden`.
pub fn authenticated(principal: Option<&Principal>) -> Result<&Principal, AuthzError> {
    principal.ok_or(AuthzError::Unauthenticated)
}

fn join(perms: &[Permission], sep: &str) -> String {
    perms.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(sep)
}
