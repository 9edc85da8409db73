use chrono::Duration;

use crate::password::PasswordCost;
use crate::roles::RoleMasks;

/// Insecure secret used when none is configured outside production.
pub const DEV_JWT_SECRET: &str = "taxifleet-dev-secret-change-me";

/// Authentication settings, built once at startup.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub password_cost: PasswordCost,
    pub role_masks: RoleMasks,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
            password_cost: PasswordCost::default(),
            role_masks: RoleMasks::default(),
        }
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("password_cost", &self.password_cost)
            .field("role_masks", &self.role_masks)
            .finish()
    }
}
