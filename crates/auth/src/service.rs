//! Authentication service: login, token validation, refresh and logout.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taxifleet_core::{DomainError, UserId};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password::{PasswordHasher, validate_password};
use crate::roles::RoleMasks;
use crate::session::{Session, SessionRepository};
use crate::token::{IssuedToken, TokenCodec};
use crate::user::{User, UserRepository, normalize_email};

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Self-service profile changes. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    tokens: TokenCodec,
    hasher: PasswordHasher,
    /// Verified against when the email is unknown, so both failure paths pay
    /// for one Argon2 run.
    dummy_hash: String,
    masks: RoleMasks,
}

impl AuthService {
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Result<Self, AuthError> {
        let hasher = PasswordHasher::new(config.password_cost)?;
        let dummy_hash = hasher.hash("unknown-account")?;
        Ok(Self {
            users,
            sessions,
            tokens: TokenCodec::new(
                config.jwt_secret.as_bytes(),
                config.access_token_ttl,
                config.refresh_token_ttl,
            ),
            hasher,
            dummy_hash,
            masks: config.role_masks,
        })
    }

    pub fn role_masks(&self) -> &RoleMasks {
        &self.masks
    }

    pub fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        self.login_at(email, password, Utc::now())
    }

    pub fn login_at(&self, email: &str, password: &str, now: DateTime<Utc>) -> Result<LoginResponse, AuthError> {
        let Some(user) = self.users.find_by_email(&normalize_email(email))? else {
            self.hasher.verify(password, &self.dummy_hash)?;
            tracing::debug!("login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.active {
            return Err(AuthError::AccountInactive);
        }

        let access = self.tokens.issue_access(&user, now)?;
        let refresh = self.tokens.issue_refresh(&user, now)?;
        self.sessions
            .insert(Session::new(user.id, refresh.token.clone(), refresh.expires_at, now))?;

        tracing::info!(
            user_id = %user.id,
            tenant_id = %user.tenant_id,
            role = self.masks.role_name(user.permission),
            "user logged in"
        );

        Ok(LoginResponse {
            access_token: access.token,
            refresh_token: refresh.token,
            expires_at: access.expires_at,
            user,
        })
    }

    /// Verify an access token and return the *live* user behind it.
    pub fn validate_token(&self, token: &str) -> Result<User, AuthError> {
        self.validate_token_at(token, Utc::now())
    }

    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<User, AuthError> {
        let claims = self.tokens.decode_access(token, now)?;
        let user_id = TokenCodec::subject(&claims)?;

        let user = self.users.get(user_id)?.ok_or(AuthError::InvalidToken)?;
        if !user.active {
            return Err(AuthError::AccountInactive);
        }
        Ok(user)
    }

    /// New access token for a live session. The refresh token is not rotated.
    pub fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        self.refresh_at(refresh_token, Utc::now())
    }

    pub fn refresh_at(&self, refresh_token: &str, now: DateTime<Utc>) -> Result<RefreshResponse, AuthError> {
        let session = self
            .sessions
            .find_by_token(refresh_token)?
            .filter(|s| s.is_live(now))
            .ok_or(AuthError::InvalidRefreshToken)?;

        let user = self.users.get(session.user_id)?.ok_or(AuthError::InvalidRefreshToken)?;
        if !user.active {
            return Err(AuthError::AccountInactive);
        }

        let IssuedToken { token, expires_at } = self.tokens.issue_access(&user, now)?;
        tracing::debug!(user_id = %user.id, "access token refreshed");
        Ok(RefreshResponse {
            access_token: token,
            expires_at,
        })
    }

    /// Revokes the caller's own session. Idempotent: an unknown token, or one
    /// owned by another user, is not an error and revokes nothing.
    pub fn logout(&self, user_id: UserId, refresh_token: &str) -> Result<(), AuthError> {
        if self.sessions.delete_by_token(user_id, refresh_token)? {
            tracing::info!(user_id = %user_id, "session revoked");
        }
        Ok(())
    }

    pub fn me(&self, user_id: UserId) -> Result<User, AuthError> {
        Ok(self
            .users
            .get(user_id)?
            .ok_or(DomainError::not_found("user"))?)
    }

    pub fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> Result<User, AuthError> {
        let mut user = self.me(user_id)?;

        if let Some(first_name) = update.first_name.filter(|s| !s.trim().is_empty()) {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name.filter(|s| !s.trim().is_empty()) {
            user.last_name = last_name;
        }
        if let Some(phone) = update.phone.filter(|s| !s.trim().is_empty()) {
            if phone != user.phone {
                if let Some(other) = self.users.find_by_phone(&phone)? {
                    if other.id != user.id {
                        return Err(DomainError::DuplicateKey("phone").into());
                    }
                }
                user.phone = phone;
            }
        }
        if let Some(password) = update.password {
            validate_password(&password)?;
            user.password_hash = self.hasher.hash(&password)?;
        }

        user.updated_at = Utc::now();
        Ok(self.users.update(user)?)
    }
}
