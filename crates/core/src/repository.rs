//! Persistence contract consumed by the services.
//!
//! Finders return `Ok(None)` for "not found"; `Err` is reserved for failures
//! the store could not classify.

use crate::entity::{Entity, SoftDelete};
use crate::error::DomainResult;

/// CRUD by id over one entity type. Deletion is logical.
pub trait Repository<T>: Send + Sync
where
    T: Entity + SoftDelete,
{
    /// Persist a new entity; the store assigns and returns its id.
    fn insert(&self, item: T) -> DomainResult<T>;

    /// Fetch a live (non-deleted) entity.
    fn get(&self, id: T::Id) -> DomainResult<Option<T>>;

    /// Full overwrite of the stored entity.
    fn update(&self, item: T) -> DomainResult<T>;

    /// Soft delete. Missing ids are `NotFound`.
    fn delete(&self, id: T::Id) -> DomainResult<()>;
}
