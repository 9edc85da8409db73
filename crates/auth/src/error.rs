use thiserror::Error;

use taxifleet_core::DomainError;

/// Authentication failures.
///
/// An unknown email and a wrong password both map to `InvalidCredentials`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is inactive")]
    AccountInactive,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token")]
    InvalidToken,

    #[error("invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
