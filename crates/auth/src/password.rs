//! Password hashing (Argon2id) with a configurable cost.

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier as _, Version};
use serde::{Deserialize, Serialize};

use taxifleet_core::{DomainError, DomainResult};

use crate::error::AuthError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Argon2 cost parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(cost: PasswordCost) -> Result<Self, AuthError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| AuthError::Crypto(format!("invalid password cost: {e}")))?;
        Ok(Self {
            argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// PHC-formatted hash with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::Crypto(format!("password hashing failed: {e}")))
    }

    /// Constant-time verification. A mismatch is `Ok(false)`, not an error.
    ///
    /// The cost stored in `hash` wins over the configured one, so hashes made
    /// under an older cost keep verifying.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Crypto(format!("malformed password hash: {e}")))?;
        match self.argon.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Crypto(format!("password verification failed: {e}"))),
        }
    }
}

pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn cheap_cost() -> PasswordCost {
    PasswordCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = PasswordHasher::new(cheap_cost()).unwrap();
        let hash = hasher.hash("driver123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("driver123", &hash).unwrap());
        assert!(!hasher.verify("driver124", &hash).unwrap());
    }

    #[test]
    fn salts_differ() {
        let hasher = PasswordHasher::new(cheap_cost()).unwrap();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn malformed_hash_is_a_crypto_error() {
        let hasher = PasswordHasher::new(cheap_cost()).unwrap();
        assert!(matches!(hasher.verify("x", "plaintext"), Err(AuthError::Crypto(_))));
    }

    #[test]
    fn zero_cost_is_rejected() {
        let cost = PasswordCost {
            iterations: 0,
            ..cheap_cost()
        };
        assert!(PasswordHasher::new(cost).is_err());
    }

    #[test]
    fn short_passwords_fail_validation() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }
}
