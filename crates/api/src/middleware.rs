use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use taxifleet_auth::{AuthService, AuthzError, Principal};

use crate::app::errors;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub auth: Arc<AuthService>,
}

/// Validates the bearer access token against the live user record and
/// attaches the principal context to the request.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())
        .ok_or_else(|| errors::authz_error_to_response(AuthzError::Unauthenticated))?;

    let user = state
        .auth
        .validate_token(token)
        .map_err(errors::auth_error_to_response)?;

    let principal = Principal::from(&user);
    let role = state.auth.role_masks().role_name(principal.permissions);
    tracing::debug!(user_id = %user.id, tenant_id = %user.tenant_id, role, "authenticated");

    req.extensions_mut().insert(PrincipalContext::new(principal, role));

    Ok(next.run(req).await)
}

/// One line per request: method, path, status, latency.
pub async fn request_logging(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    if status >= 500 {
        tracing::error!(%method, %path, status, latency_ms, "request failed");
    } else {
        tracing::info!(%method, %path, status, latency_ms, "request");
    }
    response
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
