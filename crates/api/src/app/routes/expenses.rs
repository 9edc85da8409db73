use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
    routing::get,
    Router,
};

use taxifleet_auth::Permission;
use taxifleet_core::ExpenseId;
use taxifleet_fleet::{ExpensePatch, NewExpense};

use crate::app::dto::{self, ApiJson};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_expenses).post(create_expense))
        .route("/:id", get(get_expense).put(update_expense).delete(delete_expense))
}

pub async fn list_expenses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::VIEW_EXPENSES) {
        return denied;
    }
    match services.expenses.list(principal.principal()) {
        Ok(expenses) => dto::items(expenses),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_expense(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<NewExpense>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::ADD_EXPENSES) {
        return denied;
    }
    match services.expenses.create(principal.principal(), body) {
        Ok(expense) => dto::created(expense),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_expense(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::VIEW_EXPENSES) {
        return denied;
    }
    let id: ExpenseId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.expenses.get(principal.principal(), id) {
        Ok(expense) => dto::ok(expense),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_expense(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ExpensePatch>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::EDIT_EXPENSES) {
        return denied;
    }
    let id: ExpenseId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.expenses.update(principal.principal(), id, body) {
        Ok(expense) => dto::ok(expense),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_expense(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = authz::require(&principal, Permission::DELETE_EXPENSES) {
        return denied;
    }
    let id: ExpenseId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.expenses.delete(principal.principal(), id) {
        Ok(()) => dto::deleted(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
