//! Permission bits and mask algebra.
//!
//! A permission is one bit of a 32-bit mask. Masks are stored as signed
//! integers by some backends, so the admin sentinel may arrive as `-1`; every
//! deserialization path normalizes it to `u32::MAX`.

use core::fmt;
use core::ops::BitOr;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single capability bit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Permission(u32);

impl Permission {
    pub const VIEW_REPORTS: Self = Self(1 << 0);
    pub const ADD_REPORTS: Self = Self(1 << 1);
    pub const EDIT_REPORTS: Self = Self(1 << 2);
    pub const DELETE_REPORTS: Self = Self(1 << 3);

    pub const VIEW_TAXIS: Self = Self(1 << 4);
    pub const ADD_TAXIS: Self = Self(1 << 5);
    pub const EDIT_TAXIS: Self = Self(1 << 6);
    pub const DELETE_TAXIS: Self = Self(1 << 7);

    pub const VIEW_EXPENSES: Self = Self(1 << 8);
    pub const ADD_EXPENSES: Self = Self(1 << 9);
    pub const EDIT_EXPENSES: Self = Self(1 << 10);
    pub const DELETE_EXPENSES: Self = Self(1 << 11);

    pub const VIEW_DEPOSITS: Self = Self(1 << 12);
    pub const ADD_DEPOSITS: Self = Self(1 << 13);
    pub const EDIT_DEPOSITS: Self = Self(1 << 14);
    pub const DELETE_DEPOSITS: Self = Self(1 << 15);

    pub const VIEW_USERS: Self = Self(1 << 16);
    pub const ADD_USERS: Self = Self(1 << 17);
    pub const EDIT_USERS: Self = Self(1 << 18);
    pub const DELETE_USERS: Self = Self(1 << 19);

    pub const MANAGE_TENANTS: Self = Self(1 << 20);

    /// Every defined bit, lowest first.
    pub const ALL: [Permission; 21] = [
        Self::VIEW_REPORTS,
        Self::ADD_REPORTS,
        Self::EDIT_REPORTS,
        Self::DELETE_REPORTS,
        Self::VIEW_TAXIS,
        Self::ADD_TAXIS,
        Self::EDIT_TAXIS,
        Self::DELETE_TAXIS,
        Self::VIEW_EXPENSES,
        Self::ADD_EXPENSES,
        Self::EDIT_EXPENSES,
        Self::DELETE_EXPENSES,
        Self::VIEW_DEPOSITS,
        Self::ADD_DEPOSITS,
        Self::EDIT_DEPOSITS,
        Self::DELETE_DEPOSITS,
        Self::VIEW_USERS,
        Self::ADD_USERS,
        Self::EDIT_USERS,
        Self::DELETE_USERS,
        Self::MANAGE_TENANTS,
    ];

    pub const fn bit(self) -> u32 {
        self.0
    }

    /// Dotted display name, e.g. `reports.view`.
    pub fn as_str(self) -> &'static str {
        const NAMES: [&str; 21] = [
            "reports.view",
            "reports.add",
            "reports.edit",
            "reports.delete",
            "taxis.view",
            "taxis.add",
            "taxis.edit",
            "taxis.delete",
            "expenses.view",
            "expenses.add",
            "expenses.edit",
            "expenses.delete",
            "deposits.view",
            "deposits.add",
            "deposits.edit",
            "deposits.delete",
            "users.view",
            "users.add",
            "users.edit",
            "users.delete",
            "tenants.manage",
        ];
        NAMES[self.0.trailing_zeros() as usize]
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Out-of-range stored mask.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid permission mask: {0}")]
pub struct InvalidMask(pub String);

/// A caller's granted capabilities.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct PermissionMask(u32);

impl PermissionMask {
    pub const NONE: Self = Self(0);

    /// Admin sentinel: all bits set.
    pub const ADMIN: Self = Self(u32::MAX);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Normalize a mask read from signed storage (`-1` is admin).
    pub fn from_stored(value: i64) -> Result<Self, InvalidMask> {
        match value {
            -1 => Ok(Self::ADMIN),
            v if (0..=i64::from(u32::MAX)).contains(&v) => Ok(Self(v as u32)),
            v => Err(InvalidMask(v.to_string())),
        }
    }

    pub const fn with(self, permission: Permission) -> Self {
        Self(self.0 | permission.0)
    }

    pub const fn is_admin(self) -> bool {
        self.0 == u32::MAX
    }

    pub fn has(self, required: Permission) -> bool {
        self.is_admin() || self.0 & required.0 != 0
    }

    pub fn has_any(self, required: &[Permission]) -> bool {
        self.is_admin() || required.iter().any(|p| self.0 & p.0 != 0)
    }

    pub fn has_all(self, required: &[Permission]) -> bool {
        self.is_admin() || required.iter().all(|p| self.0 & p.0 != 0)
    }

    /// Every bit of `other` is granted.
    pub fn contains(self, other: PermissionMask) -> bool {
        self.is_admin() || self.0 & other.0 == other.0
    }
}

impl From<Permission> for PermissionMask {
    fn from(value: Permission) -> Self {
        Self(value.0)
    }
}

impl From<PermissionMask> for u32 {
    fn from(value: PermissionMask) -> Self {
        value.0
    }
}

impl TryFrom<i64> for PermissionMask {
    type Error = InvalidMask;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_stored(value)
    }
}

impl BitOr for Permission {
    type Output = PermissionMask;

    fn bitor(self, rhs: Self) -> PermissionMask {
        PermissionMask(self.0 | rhs.0)
    }
}

impl BitOr<Permission> for PermissionMask {
    type Output = PermissionMask;

    fn bitor(self, rhs: Permission) -> PermissionMask {
        self.with(rhs)
    }
}

impl fmt::Display for PermissionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Accepts decimal, `0x` hex, or `-1`.
impl FromStr for PermissionMask {
    type Err = InvalidMask;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => i64::from_str_radix(hex, 16),
            None => s.parse::<i64>(),
        };
        let value = parsed.map_err(|_| InvalidMask(s.to_string()))?;
        Self::from_stored(value)
    }
}

pub fn has_permission(mask: PermissionMask, required: Permission) -> bool {
    mask.has(required)
}

pub fn has_any_permission(mask: PermissionMask, required: &[Permission]) -> bool {
    mask.has_any(required)
}

pub fn has_all_permissions(mask: PermissionMask, required: &[Permission]) -> bool {
    mask.has_all(required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bits_are_distinct_and_named() {
        let mut seen = 0u32;
        for p in Permission::ALL {
            assert_eq!(p.bit().count_ones(), 1);
            assert_eq!(seen & p.bit(), 0);
            seen |= p.bit();
        }
        assert_eq!(seen, 0x1F_FFFF);
        assert_eq!(Permission::MANAGE_TENANTS.as_str(), "tenants.manage");
        assert_eq!(Permission::EDIT_EXPENSES.to_string(), "expenses.edit");
    }

    #[test]
    fn minus_one_is_the_admin_sentinel() {
        assert_eq!(PermissionMask::from_stored(-1).unwrap(), PermissionMask::ADMIN);
        let mask: PermissionMask = serde_json::from_str("-1").unwrap();
        assert!(mask.is_admin());
        assert_eq!(serde_json::to_string(&mask).unwrap(), u32::MAX.to_string());
    }

    #[test]
    fn rejects_out_of_range_storage() {
        assert!(PermissionMask::from_stored(-2).is_err());
        assert!(PermissionMask::from_stored(i64::from(u32::MAX) + 1).is_err());
        assert!(serde_json::from_str::<PermissionMask>("-5").is_err());
    }

    #[test]
    fn parses_config_strings() {
        assert_eq!("3".parse::<PermissionMask>().unwrap(), PermissionMask::from_bits(3));
        assert_eq!("0xFFFFF".parse::<PermissionMask>().unwrap(), PermissionMask::from_bits(0xFFFFF));
        assert!("-1".parse::<PermissionMask>().unwrap().is_admin());
        assert!("driver".parse::<PermissionMask>().is_err());
    }

    #[test]
    fn any_and_all_over_empty_sets() {
        let mask = PermissionMask::from_bits(3);
        assert!(!mask.has_any(&[]));
        assert!(mask.has_all(&[]));
        assert!(PermissionMask::ADMIN.has_any(&[]));
    }

    #[test]
    fn contains_requires_every_bit() {
        let driver = Permission::VIEW_REPORTS | Permission::ADD_REPORTS;
        assert!(PermissionMask::from_bits(0xF).contains(driver));
        assert!(!PermissionMask::from(Permission::VIEW_REPORTS).contains(driver));
        assert!(PermissionMask::ADMIN.contains(PermissionMask::from_bits(0xFFFFF)));
    }

    fn permission() -> impl Strategy<Value = Permission> {
        (0..Permission::ALL.len()).prop_map(|i| Permission::ALL[i])
    }

    proptest! {
        #[test]
        fn admin_passes_every_check(p in permission(), set in proptest::collection::vec(permission(), 0..8)) {
            for admin in [PermissionMask::ADMIN, PermissionMask::from_stored(-1).unwrap()] {
                prop_assert!(has_permission(admin, p));
                prop_assert!(has_any_permission(admin, &set));
                prop_assert!(has_all_permissions(admin, &set));
            }
        }

        #[test]
        fn has_all_is_subset(bits in 0u32..u32::MAX, set in proptest::collection::vec(permission(), 0..8)) {
            let mask = PermissionMask::from_bits(bits);
            let expected = set.iter().all(|p| bits & p.bit() == p.bit());
            prop_assert_eq!(has_all_permissions(mask, &set), expected);
        }

        #[test]
        fn has_any_is_intersection(bits in 0u32..u32::MAX, set in proptest::collection::vec(permission(), 0..8)) {
            let mask = PermissionMask::from_bits(bits);
            let expected = set.iter().any(|p| bits & p.bit() != 0);
            prop_assert_eq!(has_any_permission(mask, &set), expected);
        }
    }
}
