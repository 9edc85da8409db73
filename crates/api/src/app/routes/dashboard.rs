use std::sync::Arc;

use axum::{extract::Extension, response::Response, routing::get, Router};

use taxifleet_auth::Permission;

use crate::app::dto;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/stats", get(stats))
}

pub async fn stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(denied) = authz::require_any(&principal, &[Permission::VIEW_DEPOSITS, Permission::VIEW_EXPENSES]) {
        return denied;
    }
    match services.dashboard.stats(principal.principal()) {
        Ok(stats) => dto::ok(stats),
        Err(e) => errors::domain_error_to_response(e),
    }
}
