use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use taxifleet_auth::{AuthError, AuthzError};
use taxifleet_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::NotFound(entity) => json_error(StatusCode::NOT_FOUND, "not_found", format!("{entity} not found")),
        DomainError::Unauthorized(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
        DomainError::InvalidState(v) => json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_state", v.to_string()),
        DomainError::DuplicateKey(field) => {
            json_error(StatusCode::CONFLICT, "duplicate_key", format!("{field} already exists"))
        }
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Internal(msg) => internal(msg),
    }
}

pub fn auth_error_to_response(err: AuthError) -> Response {
    match err {
        AuthError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", err.to_string())
        }
        AuthError::TokenExpired => json_error(StatusCode::UNAUTHORIZED, "token_expired", err.to_string()),
        AuthError::InvalidToken => json_error(StatusCode::UNAUTHORIZED, "invalid_token", err.to_string()),
        AuthError::InvalidRefreshToken => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_refresh_token", err.to_string())
        }
        AuthError::AccountInactive => json_error(StatusCode::FORBIDDEN, "account_inactive", err.to_string()),
        AuthError::Crypto(msg) => internal(msg),
        AuthError::Domain(e) => domain_error_to_response(e),
    }
}

pub fn authz_error_to_response(err: AuthzError) -> Response {
    match err {
        AuthzError::Unauthenticated => json_error(StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string()),
        AuthzError::Forbidden(_) => json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string()),
    }
}

pub fn json_rejection(rejection: JsonRejection) -> Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

/// Path ids are numeric; anything else is a validation failure.
pub fn parse_id<I>(raw: &str) -> Result<I, Response>
where
    I: FromStr<Err = DomainError>,
{
    raw.parse().map_err(domain_error_to_response)
}

fn internal(msg: String) -> Response {
    tracing::error!(error = %msg, "internal error");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
