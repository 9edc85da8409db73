//! Route-level permission guard.
//!
//! Runs after authentication and before the handler touches a service.
//! Finer rules (report ownership, lifecycle state) stay in the services.

use axum::response::Response;

use taxifleet_auth::{Permission, authorize, authorize_any};

use crate::app::errors;
use crate::context::PrincipalContext;

pub fn require(principal: &PrincipalContext, required: Permission) -> Result<(), Response> {
    authorize(principal.permissions(), required).map_err(|e| deny(principal, e))
}

pub fn require_any(principal: &PrincipalContext, required: &[Permission]) -> Result<(), Response> {
    authorize_any(principal.permissions(), required).map_err(|e| deny(principal, e))
}

fn deny(principal: &PrincipalContext, err: taxifleet_auth::AuthzError) -> Response {
    tracing::debug!(user_id = %principal.user_id(), role = principal.role(), error = %err, "request denied");
    errors::authz_error_to_response(err)
}
