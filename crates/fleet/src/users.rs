//! Cross-tenant user administration.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use taxifleet_auth::{
    PasswordHasher, PermissionMask, RoleMasks, SessionRepository, User, UserRepository, normalize_email,
    validate_password,
};
use taxifleet_core::{DomainError, DomainResult, TenantId, UserId};

use crate::scope::non_blank;
use crate::tenant::TenantRepository;

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub tenant_id: TenantId,
    pub email: String,
    pub password: String,
    /// Explicit mask; wins over `role`.
    pub permission: Option<PermissionMask>,
    /// Legacy role name, mapped through the configured role masks.
    pub role: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub tenant_id: Option<TenantId>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub permission: Option<PermissionMask>,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub active: Option<bool>,
}

fn validate_email(email: &str) -> DomainResult<String> {
    let email = normalize_email(email);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(DomainError::validation("invalid email address")),
    }
}

pub struct UserAdminService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    tenants: Arc<dyn TenantRepository>,
    hasher: PasswordHasher,
    masks: RoleMasks,
}

impl UserAdminService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        tenants: Arc<dyn TenantRepository>,
        hasher: PasswordHasher,
        masks: RoleMasks,
    ) -> Self {
        Self {
            users,
            sessions,
            tenants,
            hasher,
            masks,
        }
    }

    pub fn create(&self, input: NewUser) -> DomainResult<User> {
        self.ensure_tenant(input.tenant_id)?;
        let email = validate_email(&input.email)?;
        let phone = non_blank(Some(input.phone)).ok_or_else(|| DomainError::validation("phone is required"))?;
        validate_password(&input.password)?;

        if self.users.find_by_email(&email)?.is_some() {
            return Err(DomainError::DuplicateKey("email"));
        }
        if self.users.find_by_phone(&phone)?.is_some() {
            return Err(DomainError::DuplicateKey("phone"));
        }

        let permission = self.resolve_mask(input.permission, input.role.as_deref()).unwrap_or(self.masks.driver);
        let password_hash = self
            .hasher
            .hash(&input.password)
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let now = Utc::now();
        let user = self.users.insert(User {
            id: UserId::default(),
            tenant_id: input.tenant_id,
            email,
            password_hash,
            permission,
            first_name: input.first_name,
            last_name: input.last_name,
            phone,
            active: input.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })?;
        tracing::info!(
            user_id = %user.id,
            tenant_id = %user.tenant_id,
            role = self.masks.role_name(user.permission),
            "user created"
        );
        Ok(user)
    }

    /// All users, or those of one tenant.
    pub fn list(&self, tenant_id: Option<TenantId>) -> DomainResult<Vec<User>> {
        let mut users = match tenant_id {
            Some(tenant_id) => self.users.list_by_tenant(tenant_id)?,
            None => self.users.list_all()?,
        };
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    pub fn get(&self, id: UserId) -> DomainResult<User> {
        self.users.get(id)?.ok_or(DomainError::not_found("user"))
    }

    pub fn update(&self, id: UserId, patch: UserPatch) -> DomainResult<User> {
        let mut user = self.get(id)?;

        if let Some(tenant_id) = patch.tenant_id {
            self.ensure_tenant(tenant_id)?;
            user.tenant_id = tenant_id;
        }
        if let Some(email) = non_blank(patch.email) {
            let email = validate_email(&email)?;
            if email != user.email {
                if self.users.find_by_email(&email)?.is_some() {
                    return Err(DomainError::DuplicateKey("email"));
                }
                user.email = email;
            }
        }
        if let Some(phone) = non_blank(patch.phone) {
            if phone != user.phone {
                if self.users.find_by_phone(&phone)?.is_some() {
                    return Err(DomainError::DuplicateKey("phone"));
                }
                user.phone = phone;
            }
        }
        if let Some(password) = non_blank(patch.password) {
            validate_password(&password)?;
            user.password_hash = self
                .hasher
                .hash(&password)
                .map_err(|e| DomainError::internal(e.to_string()))?;
        }
        if let Some(mask) = self.resolve_mask(patch.permission, patch.role.as_deref()) {
            user.permission = mask;
        }
        if let Some(first_name) = non_blank(patch.first_name) {
            user.first_name = first_name;
        }
        if let Some(last_name) = non_blank(patch.last_name) {
            user.last_name = last_name;
        }
        if let Some(active) = patch.active {
            user.active = active;
        }

        user.updated_at = Utc::now();
        self.users.update(user)
    }

    /// Soft delete and revoke every session of the user.
    pub fn delete(&self, id: UserId) -> DomainResult<()> {
        self.get(id)?;
        self.users.delete(id)?;
        let revoked = self.sessions.delete_for_user(id)?;
        tracing::info!(user_id = %id, revoked_sessions = revoked, "user deleted");
        Ok(())
    }

    fn resolve_mask(&self, permission: Option<PermissionMask>, role: Option<&str>) -> Option<PermissionMask> {
        permission.or_else(|| role.map(|r| self.masks.mask_for_name(r)))
    }

    fn ensure_tenant(&self, tenant_id: TenantId) -> DomainResult<()> {
        match self.tenants.get(tenant_id)? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("tenant")),
        }
    }
}
