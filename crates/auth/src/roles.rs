use core::fmt;

use serde::{Deserialize, Serialize};

use crate::permissions::{Permission, PermissionMask};

/// Named role. Roles only seed masks; authorization always reads the mask.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Owner,
    Manager,
    Mechanic,
    Driver,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Admin, Role::Owner, Role::Manager, Role::Mechanic, Role::Driver];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Owner => "owner",
            Role::Manager => "manager",
            Role::Mechanic => "mechanic",
            Role::Driver => "driver",
        }
    }

    /// Case-insensitive lookup of a legacy role name.
    pub fn from_name(name: &str) -> Option<Role> {
        let name = name.trim();
        Role::ALL.into_iter().find(|r| r.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const OWNER_DEFAULT: PermissionMask = PermissionMask::from_bits(0xF_FFFF);

const MANAGER_DEFAULT: PermissionMask = PermissionMask::NONE
    .with(Permission::VIEW_REPORTS)
    .with(Permission::ADD_REPORTS)
    .with(Permission::EDIT_REPORTS)
    .with(Permission::VIEW_DEPOSITS)
    .with(Permission::ADD_DEPOSITS)
    .with(Permission::EDIT_DEPOSITS)
    .with(Permission::VIEW_TAXIS);

const MECHANIC_DEFAULT: PermissionMask = PermissionMask::NONE
    .with(Permission::VIEW_TAXIS)
    .with(Permission::VIEW_REPORTS);

const DRIVER_DEFAULT: PermissionMask = PermissionMask::NONE
    .with(Permission::VIEW_REPORTS)
    .with(Permission::ADD_REPORTS);

/// Role → mask table, fixed at process start.
///
/// The admin mask is not configurable: it is always the all-bits sentinel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMasks {
    pub owner: PermissionMask,
    pub manager: PermissionMask,
    pub mechanic: PermissionMask,
    pub driver: PermissionMask,
}

impl Default for RoleMasks {
    fn default() -> Self {
        Self {
            owner: OWNER_DEFAULT,
            manager: MANAGER_DEFAULT,
            mechanic: MECHANIC_DEFAULT,
            driver: DRIVER_DEFAULT,
        }
    }
}

impl RoleMasks {
    pub fn mask_for(&self, role: Role) -> PermissionMask {
        match role {
            Role::Admin => PermissionMask::ADMIN,
            Role::Owner => self.owner,
            Role::Manager => self.manager,
            Role::Mechanic => self.mechanic,
            Role::Driver => self.driver,
        }
    }

    /// Unknown names fall back to the driver mask.
    pub fn mask_for_name(&self, name: &str) -> PermissionMask {
        self.mask_for(Role::from_name(name).unwrap_or(Role::Driver))
    }

    /// Exact-match inverse of [`RoleMasks::mask_for`].
    pub fn role_of(&self, mask: PermissionMask) -> Option<Role> {
        Role::ALL.into_iter().find(|r| self.mask_for(*r) == mask)
    }

    /// Display name for logs; `"custom"` when no role matches exactly.
    pub fn role_name(&self, mask: PermissionMask) -> &'static str {
        self.role_of(mask).map(Role::as_str).unwrap_or("custom")
    }

    /// Admin, or every bit of the role's mask is granted.
    pub fn holds_role(&self, mask: PermissionMask, role: Role) -> bool {
        mask.contains(self.mask_for(role))
    }

    /// Mask is exactly the driver mask (no broader grant).
    pub fn is_plain_driver(&self, mask: PermissionMask) -> bool {
        !mask.is_admin() && mask == self.driver
    }
}

/// Mask for a legacy role name under the default table.
pub fn role_for_name(name: &str) -> PermissionMask {
    RoleMasks::default().mask_for_name(name)
}
