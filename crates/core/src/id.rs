//! Strongly-typed identifiers used across the domain.
//!
//! Identifiers are opaque numbers assigned by the store on insert. `0` is the
//! "not yet persisted" value.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(u64);

        impl $t {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $t {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| DomainError::validation(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }
    };
}

numeric_id!(
    /// Identifier of a tenant (multi-tenant boundary).
    TenantId,
    "TenantId"
);
numeric_id!(
    /// Identifier of a user (actor identity).
    UserId,
    "UserId"
);
numeric_id!(SessionId, "SessionId");
numeric_id!(TaxiId, "TaxiId");
numeric_id!(ReportId, "ReportId");
numeric_id!(ExpenseId, "ExpenseId");
numeric_id!(DepositId, "DepositId");
