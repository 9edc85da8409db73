use taxifleet_auth::{PermissionMask, Principal};
use taxifleet_core::{TenantId, UserId};

/// Principal context for a request.
///
/// Built from the caller's live user record, so the tenant and mask are
/// current even if the token was minted before a change.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
    role: &'static str,
}

impl PrincipalContext {
    pub fn new(principal: Principal, role: &'static str) -> Self {
        Self { principal, role }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.principal.tenant_id
    }

    pub fn permissions(&self) -> PermissionMask {
        self.principal.permissions
    }

    /// Role name for logs; `"custom"` for masks matching no role.
    pub fn role(&self) -> &'static str {
        self.role
    }
}
