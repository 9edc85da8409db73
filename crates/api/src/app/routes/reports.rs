//! Weekly report routes.
//!
//! The route guard only checks report visibility for lifecycle actions; who
//! may edit, submit, review or delete a given report is decided by
//! `ReportService`.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
    routing::{get, post},
    Router,
};

use taxifleet_auth::{Permission, Principal};
use taxifleet_core::{DomainResult, ReportId};
use taxifleet_fleet::{NewReport, ReportPatch, ReportService, WeeklyReport};

use crate::app::dto::{self, ApiJson};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_reports).post(create_report))
        .route("/:id", get(get_report).put(update_report).delete(delete_report))
        .route("/:id/submit", post(submit_report))
        .route("/:id/approve", post(approve_report))
        .route("/:id/reject", post(reject_report))
}

pub async fn list_reports(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::VIEW_REPORTS) {
        return denied;
    }
    match services.reports.list(principal.principal()) {
        Ok(reports) => dto::items(reports),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<NewReport>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::ADD_REPORTS) {
        return denied;
    }
    match services.reports.create(principal.principal(), body) {
        Ok(report) => dto::created(report),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    on_report(&services, &principal, &id, |reports, actor, id| reports.get(actor, id))
}

pub async fn update_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ReportPatch>,
) -> Response {
    on_report(&services, &principal, &id, |reports, actor, id| reports.update(actor, id, body))
}

pub async fn submit_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    on_report(&services, &principal, &id, |reports, actor, id| reports.submit(actor, id))
}

pub async fn approve_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    on_report(&services, &principal, &id, |reports, actor, id| reports.approve(actor, id))
}

pub async fn reject_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    on_report(&services, &principal, &id, |reports, actor, id| reports.reject(actor, id))
}

pub async fn delete_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::VIEW_REPORTS) {
        return denied;
    }
    let id: ReportId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.reports.delete(principal.principal(), id) {
        Ok(()) => dto::deleted(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Guard, parse the id, run `op`, render the resulting report.
fn on_report<F>(services: &AppServices, principal: &PrincipalContext, raw_id: &str, op: F) -> Response
where
    F: FnOnce(&ReportService, &Principal, ReportId) -> DomainResult<WeeklyReport>,
{
    if let Err(denied) = authz::require(principal, Permission::VIEW_REPORTS) {
        return denied;
    }
    let id: ReportId = match errors::parse_id(raw_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match op(&services.reports, principal.principal(), id) {
        Ok(report) => dto::ok(report),
        Err(e) => errors::domain_error_to_response(e),
    }
}
