//! `taxifleet-auth` — authentication and authorization boundary.
//!
//! Permission bits and role masks, the pure authorization guard, HS256 tokens,
//! Argon2 password hashing and the session-backed [`AuthService`]. Decoupled
//! from HTTP; storage is reached through the repository traits declared here.

pub mod authorize;
pub mod claims;
pub mod config;
pub mod error;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod service;
pub mod session;
pub mod token;
pub mod user;

pub use authorize::{AuthzError, authenticated, authorize, authorize_all, authorize_any};
pub use claims::{AccessClaims, RefreshClaims, TokenKind, TokenValidationError, validate_window};
pub use config::{AuthConfig, DEV_JWT_SECRET};
pub use error::AuthError;
pub use password::{PasswordCost, PasswordHasher, validate_password};
pub use permissions::{
    InvalidMask, Permission, PermissionMask, has_all_permissions, has_any_permission, has_permission,
};
pub use principal::Principal;
pub use roles::{Role, RoleMasks, role_for_name};
pub use service::{AuthService, LoginResponse, ProfileUpdate, RefreshResponse};
pub use session::{Session, SessionRepository};
pub use token::{IssuedToken, TokenCodec};
pub use user::{User, UserRepository, normalize_email};
