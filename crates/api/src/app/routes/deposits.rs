use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
    routing::get,
    Router,
};

use taxifleet_auth::Permission;
use taxifleet_core::DepositId;
use taxifleet_fleet::{DepositPatch, NewDeposit};

use crate::app::dto::{self, ApiJson};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_deposits).post(create_deposit))
        .route("/:id", get(get_deposit).put(update_deposit).delete(delete_deposit))
}

pub async fn list_deposits(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::VIEW_DEPOSITS) {
        return denied;
    }
    match services.deposits.list(principal.principal()) {
        Ok(deposits) => dto::items(deposits),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<NewDeposit>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::ADD_DEPOSITS) {
        return denied;
    }
    match services.deposits.create(principal.principal(), body) {
        Ok(deposit) => dto::created(deposit),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::VIEW_DEPOSITS) {
        return denied;
    }
    let id: DepositId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.deposits.get(principal.principal(), id) {
        Ok(deposit) => dto::ok(deposit),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<DepositPatch>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::EDIT_DEPOSITS) {
        return denied;
    }
    let id: DepositId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.deposits.update(principal.principal(), id, body) {
        Ok(deposit) => dto::ok(deposit),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::DELETE_DEPOSITS) {
        return denied;
    }
    let id: DepositId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.deposits.delete(principal.principal(), id) {
        Ok(()) => dto::deleted(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
