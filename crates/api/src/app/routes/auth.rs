use std::sync::Arc;

use axum::{
    extract::Extension,
    response::Response,
    routing::{get, post, put},
    Router,
};

use taxifleet_auth::{AuthError, ProfileUpdate};

use crate::app::dto::{self, ApiJson, LoginRequest, RefreshRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Routes reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn router() -> Router {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/auth/profile", put(update_profile))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Response {
    // Argon2 verification blocks; run it off the async workers.
    let auth = services.auth.clone();
    let result = tokio::task::spawn_blocking(move || auth.login(&body.email, &body.password)).await;
    match result {
        Ok(Ok(session)) => dto::ok(session),
        Ok(Err(e)) => {
            tracing::info!(error = %e, "login rejected");
            errors::auth_error_to_response(e)
        }
        Err(e) => errors::auth_error_to_response(AuthError::Crypto(format!("login task failed: {e}"))),
    }
}

pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> Response {
    match services.auth.refresh(&body.refresh_token) {
        Ok(token) => dto::ok(token),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> Response {
    match services.auth.logout(principal.user_id(), &body.refresh_token) {
        Ok(()) => {
            tracing::info!(user_id = %principal.user_id(), "logged out");
            dto::ok(serde_json::json!({ "message": "logged out" }))
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    match services.auth.me(principal.user_id()) {
        Ok(user) => dto::ok(serde_json::json!({
            "user": user,
            "role": principal.role(),
        })),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> Response {
    let auth = services.auth.clone();
    let user_id = principal.user_id();
    let result = tokio::task::spawn_blocking(move || auth.update_profile(user_id, body)).await;
    match result {
        Ok(Ok(user)) => dto::ok(user),
        Ok(Err(e)) => errors::auth_error_to_response(e),
        Err(e) => errors::auth_error_to_response(AuthError::Crypto(format!("profile task failed: {e}"))),
    }
}
