//! Tenant isolation helpers shared by every service.

use serde::{Deserialize, Deserializer};

use taxifleet_core::{DomainError, DomainResult, Repository, SoftDelete, TenantId, TenantScoped};

/// Fetch an entity visible to `tenant_id`.
///
/// Entities of another tenant are reported exactly like missing ones.
pub fn load_scoped<T, R>(repo: &R, id: T::Id, tenant_id: TenantId, entity: &'static str) -> DomainResult<T>
where
    T: TenantScoped + SoftDelete,
    R: Repository<T> + ?Sized,
{
    match repo.get(id)? {
        Some(item) if item.belongs_to(tenant_id) => Ok(item),
        _ => Err(DomainError::not_found(entity)),
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Non-blank string or `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
