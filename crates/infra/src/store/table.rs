use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use taxifleet_core::{DomainError, DomainResult, Entity, ExpectedVersion, Repository, SoftDelete, Versioned};

/// Per-entity hook applied by the store on every overwrite.
pub trait Stored: Entity + SoftDelete + Clone + Send + Sync + 'static {
    fn before_update(&mut self, _stored: &Self) {}
}

/// In-memory table keyed by store-assigned ids, for tests/dev.
///
/// Soft-deleted rows stay in the map and are invisible to every read.
#[derive(Debug)]
pub struct InMemoryTable<T> {
    entity: &'static str,
    rows: RwLock<BTreeMap<u64, T>>,
    next_id: AtomicU64,
}

impl<T> InMemoryTable<T> {
    /// `entity` names the rows in `NotFound` errors.
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<T: Stored> InMemoryTable<T> {
    fn read(&self) -> DomainResult<RwLockReadGuard<'_, BTreeMap<u64, T>>> {
        self.rows
            .read()
            .map_err(|_| DomainError::internal(format!("{} table lock poisoned", self.entity)))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, BTreeMap<u64, T>>> {
        self.rows
            .write()
            .map_err(|_| DomainError::internal(format!("{} table lock poisoned", self.entity)))
    }

    /// First live row matching `pred`.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> DomainResult<Option<T>> {
        Ok(self.read()?.values().find(|r| !r.is_deleted() && pred(r)).cloned())
    }

    /// Live rows matching `pred`, in id order.
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> DomainResult<Vec<T>> {
        Ok(self.read()?.values().filter(|r| !r.is_deleted() && pred(r)).cloned().collect())
    }

    /// Soft-delete every live row matching `pred`; returns the count.
    pub fn delete_where(&self, pred: impl Fn(&T) -> bool) -> DomainResult<usize> {
        let now = Utc::now();
        let mut rows = self.write()?;
        let mut removed = 0;
        for row in rows.values_mut().filter(|r| !r.is_deleted() && pred(r)) {
            row.mark_deleted(now);
            removed += 1;
        }
        Ok(removed)
    }

    fn replace(&self, mut item: T, check: impl FnOnce(&T) -> DomainResult<()>) -> DomainResult<T> {
        let key: u64 = item.id().into();
        let mut rows = self.write()?;
        let row = rows
            .get_mut(&key)
            .filter(|r| !r.is_deleted())
            .ok_or(DomainError::not_found(self.entity))?;
        check(row)?;
        item.before_update(row);
        *row = item.clone();
        Ok(item)
    }

    /// Version-checked overwrite.
    pub fn update_checked(&self, item: T, expected: ExpectedVersion) -> DomainResult<T>
    where
        T: Versioned,
    {
        self.replace(item, |stored| expected.check(stored.version()))
    }
}

impl<T: Stored> Repository<T> for InMemoryTable<T> {
    fn insert(&self, mut item: T) -> DomainResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        item.set_id(T::Id::from(id));
        self.write()?.insert(id, item.clone());
        Ok(item)
    }

    fn get(&self, id: T::Id) -> DomainResult<Option<T>> {
        let key: u64 = id.into();
        Ok(self.read()?.get(&key).filter(|r| !r.is_deleted()).cloned())
    }

    fn update(&self, item: T) -> DomainResult<T> {
        self.replace(item, |_| Ok(()))
    }

    fn delete(&self, id: T::Id) -> DomainResult<()> {
        let key: u64 = id.into();
        let mut rows = self.write()?;
        let row = rows
            .get_mut(&key)
            .filter(|r| !r.is_deleted())
            .ok_or(DomainError::not_found(self.entity))?;
        row.mark_deleted(Utc::now());
        Ok(())
    }
}
