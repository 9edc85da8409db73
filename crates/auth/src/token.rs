//! HS256 token issuing and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use uuid::Uuid;

use taxifleet_core::UserId;

use crate::claims::{AccessClaims, RefreshClaims, TokenKind, TokenValidationError, validate_window};
use crate::error::AuthError;
use crate::user::User;

/// A freshly minted token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Symmetric-secret token codec.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an injected clock in `validate_window`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue_access(&self, user: &User, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expires_at = expiry(now, self.access_ttl)?;
        let claims = AccessClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            permission: user.permission,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::now_v7().to_string(),
            typ: TokenKind::Access,
        };
        Ok(IssuedToken {
            token: self.sign(&claims)?,
            expires_at,
        })
    }

    pub fn issue_refresh(&self, user: &User, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expires_at = expiry(now, self.refresh_ttl)?;
        let claims = RefreshClaims {
            sub: user.id.to_string(),
            permission: user.permission,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::now_v7().to_string(),
            typ: TokenKind::Refresh,
        };
        Ok(IssuedToken {
            token: self.sign(&claims)?,
            expires_at,
        })
    }

    /// Verify signature, kind and time window of an access token.
    pub fn decode_access(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, AuthError> {
        let data = decode::<AccessClaims>(token, &self.decoding, &self.validation).map_err(map_jwt_error)?;
        let claims = data.claims;
        if claims.typ != TokenKind::Access {
            return Err(AuthError::InvalidToken);
        }
        validate_window(claims.iat, claims.exp, now).map_err(|e| match e {
            TokenValidationError::Expired => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;
        Ok(claims)
    }

    /// Subject of verified claims.
    pub fn subject(claims: &AccessClaims) -> Result<UserId, AuthError> {
        claims.sub.parse().map_err(|_| AuthError::InvalidToken)
    }

    fn sign<C: Serialize>(&self, claims: &C) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Crypto(format!("token encoding failed: {e}")))
    }
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, AuthError> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| AuthError::Crypto("token lifetime out of range".to_string()))
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::PermissionMask;
    use taxifleet_core::TenantId;

    fn user() -> User {
        User::fixture(UserId::new(9), TenantId::new(1), "driver@fleet.test", PermissionMask::from_bits(3))
    }

    fn codec(secret: &[u8]) -> TokenCodec {
        TokenCodec::new(secret, Duration::minutes(15), Duration::days(7))
    }

    #[test]
    fn access_token_round_trip() {
        let now = Utc::now();
        let codec = codec(b"secret");
        let issued = codec.issue_access(&user(), now).unwrap();
        assert_eq!(issued.expires_at, now + Duration::minutes(15));

        let claims = codec.decode_access(&issued.token, now).unwrap();
        assert_eq!(TokenCodec::subject(&claims).unwrap(), UserId::new(9));
        assert_eq!(claims.email, "driver@fleet.test");
        assert_eq!(claims.permission.bits(), 3);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let now = Utc::now();
        let codec = codec(b"secret");
        let issued = codec.issue_access(&user(), now).unwrap();
        let later = now + Duration::minutes(16);
        assert_eq!(codec.decode_access(&issued.token, later), Err(AuthError::TokenExpired));
    }

    #[test]
    fn wrong_secret_and_garbage_are_invalid() {
        let now = Utc::now();
        let issued = codec(b"secret").issue_access(&user(), now).unwrap();
        assert_eq!(codec(b"other").decode_access(&issued.token, now), Err(AuthError::InvalidToken));
        assert_eq!(codec(b"secret").decode_access("not-a-jwt", now), Err(AuthError::InvalidToken));
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let now = Utc::now();
        let codec = codec(b"secret");
        let refresh = codec.issue_refresh(&user(), now).unwrap();
        assert_eq!(codec.decode_access(&refresh.token, now), Err(AuthError::InvalidToken));
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let codec = TokenCodec::new(b"secret", Duration::days(365 * 300_000), Duration::days(365 * 300_000));
        let now = Utc::now();
        assert!(matches!(codec.issue_access(&user(), now), Err(AuthError::Crypto(_))));
        assert!(matches!(codec.issue_refresh(&user(), now), Err(AuthError::Crypto(_))));
    }

    #[test]
    fn tokens_minted_in_the_same_second_differ() {
        let now = Utc::now();
        let codec = codec(b"secret");
        let a = codec.issue_refresh(&user(), now).unwrap();
        let b = codec.issue_refresh(&user(), now).unwrap();
        assert_ne!(a.token, b.token);
    }
}
