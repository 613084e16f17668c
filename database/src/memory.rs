// In-process table backing the repositories

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::errors::{DatabaseError, DbResult};
use crate::models::{Model, PaginatedResult, Pagination};

/// Insertion-ordered table keyed by entity id.
///
/// Iteration follows creation order, which the scheduler relies on as the
/// final tie-breaker when ordering queued runs and picking definitions.
pub struct MemoryTable<T: Model> {
    rows: RwLock<IndexMap<String, T>>,
}

impl<T: Model> Default for MemoryTable<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(IndexMap::new()),
        }
    }
}

impl<T: Model> MemoryTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, entity: &T) -> DbResult<T> {
        let mut rows = self.rows.write();
        if rows.contains_key(entity.id()) {
            return Err(DatabaseError::AlreadyExists {
                entity: T::ENTITY,
                id: entity.id().to_string(),
            });
        }
        rows.insert(entity.id().to_string(), entity.clone());
        Ok(entity.clone())
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.rows.read().get(id).cloned()
    }

    /// Replace a stored row.
    ///
    /// Versioned entities are compare-and-swapped: the caller's version must
    /// equal the stored one, and the stored copy gets the bumped version.
    pub fn replace(&self, entity: &T) -> DbResult<T> {
        let mut rows = self.rows.write();
        let stored = rows.get_mut(entity.id()).ok_or_else(|| DatabaseError::NotFound {
            entity: T::ENTITY,
            id: entity.id().to_string(),
        })?;

        let mut next = entity.clone();
        if let (Some(expected), Some(found)) = (entity.version(), stored.version()) {
            if expected != found {
                debug!("Stale write to {} {}: version {} != {}", T::ENTITY, entity.id(), expected, found);
                return Err(DatabaseError::VersionConflict {
                    entity: T::ENTITY,
                    id: entity.id().to_string(),
                    expected,
                    found,
                });
            }
            next.bump_version();
        }

        *stored = next.clone();
        Ok(next)
    }

    /// Removes while keeping the order of the remaining rows
    pub fn remove(&self, id: &str) -> bool {
        self.rows.write().shift_remove(id).is_some()
    }

    pub fn filter<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    pub fn find<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows.read().values().find(|row| predicate(row)).cloned()
    }

    pub fn page(&self, pagination: &Pagination) -> PaginatedResult<T> {
        PaginatedResult::from_filtered(self.filter(|_| true), pagination)
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}
