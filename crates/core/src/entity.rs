//! Entity traits: identity, tenant ownership and soft deletion.

use chrono::{DateTime, Utc};

use crate::id::TenantId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + From<u64> + Into<u64>;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// Assigned by the store on insert.
    fn set_id(&mut self, id: Self::Id);
}

/// Entity partitioned by tenant.
pub trait TenantScoped: Entity {
    fn tenant_id(&self) -> TenantId;

    /// `true` when the entity is visible to callers of `tenant_id`.
    fn belongs_to(&self, tenant_id: TenantId) -> bool {
        self.tenant_id() == tenant_id
    }
}

/// Logical deletion: rows are stamped, never destroyed.
pub trait SoftDelete {
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    fn mark_deleted(&mut self, at: DateTime<Utc>);

    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}
