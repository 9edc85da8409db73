//! Cross-tenant administration: tenants and users.
//!
//! Every route requires the tenant-management permission, which only the
//! admin mask carries by default.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::Response,
    routing::get,
    Router,
};

use taxifleet_auth::Permission;
use taxifleet_core::{TenantId, UserId};
use taxifleet_fleet::{NewTenant, NewUser, TenantPatch, UserPatch};

use crate::app::dto::{self, ApiJson, TenantFilter};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/tenants", get(list_tenants).post(create_tenant))
        .route("/tenants/:id", get(get_tenant).put(update_tenant).delete(delete_tenant))
        .route("/users", get(list_users).post(create_user))
        .route("/users/tenant/:tenant_id", get(list_tenant_users))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
}

fn guard(principal: &PrincipalContext) -> Result<(), Response> {
    authz::require(principal, Permission::MANAGE_TENANTS)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tenants
// ─────────────────────────────────────────────────────────────────────────────

pub async fn list_tenants(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(denied) = guard(&principal) {
        return denied;
    }
    match services.tenants.list() {
        Ok(tenants) => dto::items(tenants),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_tenant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<NewTenant>,
) -> Response {
    if let Err(denied) = guard(&principal) {
        return denied;
    }
    match services.tenants.create(body) {
        Ok(tenant) => {
            tracing::info!(tenant_id = %tenant.id, by = %principal.user_id(), "tenant created");
            dto::created(tenant)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_tenant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = guard(&principal) {
        return denied;
    }
    let id: TenantId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.tenants.get(id) {
        Ok(tenant) => dto::ok(tenant),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_tenant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<TenantPatch>,
) -> Response {
    if let Err(denied) = guard(&principal) {
        return denied;
    }
    let id: TenantId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.tenants.update(id, body) {
        Ok(tenant) => dto::ok(tenant),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_tenant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = guard(&principal) {
        return denied;
    }
    let id: TenantId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.tenants.delete(id) {
        Ok(()) => dto::deleted(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// GET /admin/users[?tenant_id=N]
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(filter): Query<TenantFilter>,
) -> Response {
    if let Err(denied) = guard(&principal) {
        return denied;
    }
    match services.users.list(filter.tenant_id) {
        Ok(users) => dto::items(users),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_tenant_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(tenant_id): Path<String>,
) -> Response {
    if let Err(denied) = guard(&principal) {
        return denied;
    }
    let tenant_id: TenantId = match errors::parse_id(&tenant_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.users.list(Some(tenant_id)) {
        Ok(users) => dto::items(users),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<NewUser>,
) -> Response {
    if let Err(denied) = guard(&principal) {
        return denied;
    }
    let result = tokio::task::spawn_blocking(move || services.users.create(body)).await;
    match result {
        Ok(Ok(user)) => {
            tracing::info!(user_id = %user.id, tenant_id = %user.tenant_id, by = %principal.user_id(), "user created");
            dto::created(user)
        }
        Ok(Err(e)) => errors::domain_error_to_response(e),
        Err(e) => errors::domain_error_to_response(taxifleet_core::DomainError::internal(e.to_string())),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = guard(&principal) {
        return denied;
    }
    let id: UserId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.users.get(id) {
        Ok(user) => dto::ok(user),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UserPatch>,
) -> Response {
    if let Err(denied) = guard(&principal) {
        return denied;
    }
    let id: UserId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let result = tokio::task::spawn_blocking(move || services.users.update(id, body)).await;
    match result {
        Ok(Ok(user)) => dto::ok(user),
        Ok(Err(e)) => errors::domain_error_to_response(e),
        Err(e) => errors::domain_error_to_response(taxifleet_core::DomainError::internal(e.to_string())),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = guard(&principal) {
        return denied;
    }
    let id: UserId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.users.delete(id) {
        Ok(()) => dto::deleted(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
