use chrono::{DateTime, Utc};
use serde::Serialize;

use taxifleet_core::{DomainResult, Entity, Repository, SoftDelete, TenantId, TenantScoped, UserId};

use crate::permissions::PermissionMask;

/// A login identity inside one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub permission: PermissionMask,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    #[cfg(test)]
    pub(crate) fn fixture(id: UserId, tenant_id: TenantId, email: &str, permission: PermissionMask) -> Self {
        let now = Utc::now();
        Self {
            id,
            tenant_id,
            email: email.to_string(),
            password_hash: String::new(),
            permission,
            first_name: "Test".into(),
            last_name: "User".into(),
            phone: String::new(),
            active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Emails compare case-insensitively and without surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }

    fn set_id(&mut self, id: UserId) {
        self.id = id;
    }
}

impl TenantScoped for User {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl SoftDelete for User {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }
}

pub trait UserRepository: Repository<User> {
    /// Expects a normalized email.
    fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    fn find_by_phone(&self, phone: &str) -> DomainResult<Option<User>>;

    fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<User>>;

    fn list_all(&self) -> DomainResult<Vec<User>>;
}
