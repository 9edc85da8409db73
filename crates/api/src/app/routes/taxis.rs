use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
    routing::get,
    Router,
};

use taxifleet_auth::Permission;
use taxifleet_core::TaxiId;
use taxifleet_fleet::{NewTaxi, TaxiPatch};

use crate::app::dto::{self, ApiJson};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_taxis).post(create_taxi))
        .route("/:id", get(get_taxi).put(update_taxi).delete(delete_taxi))
}

pub async fn list_taxis(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::VIEW_TAXIS) {
        return denied;
    }
    match services.taxis.list(principal.principal()) {
        Ok(taxis) => dto::items(taxis),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_taxi(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<NewTaxi>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::ADD_TAXIS) {
        return denied;
    }
    match services.taxis.create(principal.principal(), body) {
        Ok(taxi) => dto::created(taxi),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_taxi(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::VIEW_TAXIS) {
        return denied;
    }
    let id: TaxiId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.taxis.get(principal.principal(), id) {
        Ok(taxi) => dto::ok(taxi),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_taxi(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<TaxiPatch>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::EDIT_TAXIS) {
        return denied;
    }
    let id: TaxiId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.taxis.update(principal.principal(), id, body) {
        Ok(taxi) => dto::ok(taxi),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_taxi(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::DELETE_TAXIS) {
        return denied;
    }
    let id: TaxiId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.taxis.delete(principal.principal(), id) {
        Ok(()) => dto::deleted(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
