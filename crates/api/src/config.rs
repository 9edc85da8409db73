//! Process configuration read from the environment (and `.env` when present).

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{Context, bail};
use chrono::Duration;

use taxifleet_auth::{AuthConfig, DEV_JWT_SECRET, PasswordCost, RoleMasks};

/// One day.
const MAX_ACCESS_MINUTES: i64 = 24 * 60;
/// One year.
const MAX_REFRESH_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub auth: AuthConfig,
    pub seed_demo: bool,
}

impl AppConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e).context("failed to read .env"),
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset and blank values use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = get("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None if environment.eq_ignore_ascii_case("production") => {
                bail!("JWT_SECRET must be set when ENVIRONMENT=production")
            }
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let defaults = AuthConfig::default();
        let role_masks = RoleMasks {
            owner: parsed(&get, "JWT_OWNER_PERMISSION_MASK", defaults.role_masks.owner)?,
            manager: parsed(&get, "JWT_MANAGER_PERMISSION_MASK", defaults.role_masks.manager)?,
            mechanic: parsed(&get, "JWT_MECHANIC_PERMISSION_MASK", defaults.role_masks.mechanic)?,
            driver: parsed(&get, "JWT_DRIVER_PERMISSION_MASK", defaults.role_masks.driver)?,
        };
        for (key, mask) in [
            ("JWT_OWNER_PERMISSION_MASK", role_masks.owner),
            ("JWT_MANAGER_PERMISSION_MASK", role_masks.manager),
            ("JWT_MECHANIC_PERMISSION_MASK", role_masks.mechanic),
            ("JWT_DRIVER_PERMISSION_MASK", role_masks.driver),
        ] {
            if mask.bits() == 0 {
                bail!("{key} must grant at least one permission");
            }
        }
        let password_cost = PasswordCost {
            memory_kib: parsed(&get, "PASSWORD_MEMORY_KIB", defaults.password_cost.memory_kib)?,
            iterations: parsed(&get, "PASSWORD_ITERATIONS", defaults.password_cost.iterations)?,
            parallelism: parsed(&get, "PASSWORD_PARALLELISM", defaults.password_cost.parallelism)?,
        };

        let access_minutes: i64 = parsed(&get, "JWT_EXPIRATION_MINUTES", 15)?;
        if !(1..=MAX_ACCESS_MINUTES).contains(&access_minutes) {
            bail!("JWT_EXPIRATION_MINUTES must be between 1 and {MAX_ACCESS_MINUTES}");
        }
        let refresh_hours: i64 = parsed(&get, "JWT_REFRESH_EXPIRATION_HOURS", 168)?;
        if !(1..=MAX_REFRESH_HOURS).contains(&refresh_hours) {
            bail!("JWT_REFRESH_EXPIRATION_HOURS must be between 1 and {MAX_REFRESH_HOURS}");
        }
        let access_token_ttl = Duration::try_minutes(access_minutes).context("JWT_EXPIRATION_MINUTES out of range")?;
        let refresh_token_ttl =
            Duration::try_hours(refresh_hours).context("JWT_REFRESH_EXPIRATION_HOURS out of range")?;

        Ok(Self {
            host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed(&get, "SERVER_PORT", 8080)?,
            environment,
            auth: AuthConfig {
                jwt_secret,
                access_token_ttl,
                refresh_token_ttl,
                password_cost,
                role_masks,
            },
            seed_demo: parsed(&get, "SEED_DEMO", false)?,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn parsed<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw}: {e}")),
        None => Ok(default),
    }
}
