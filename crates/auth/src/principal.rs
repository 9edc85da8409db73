use serde::Serialize;

use taxifleet_core::{TenantId, UserId};

use crate::permissions::{Permission, PermissionMask};
use crate::user::User;

/// The authenticated caller of a tenant-scoped operation.
///
/// Always derived from a validated token and the live user record, never from
/// request payloads.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub permissions: PermissionMask,
}

impl Principal {
    pub fn new(user_id: UserId, tenant_id: TenantId, permissions: PermissionMask) -> Self {
        Self {
            user_id,
            tenant_id,
            permissions,
        }
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.has(permission)
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.tenant_id, user.permission)
    }
}
