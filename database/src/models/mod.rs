// Storage-side traits and query types for MissionHub entities

pub mod query;

pub use query::MissionRunQuery;

use missionhub_models::{Area, MissionDefinition, MissionRun, Robot, RobotModel, Source};
use serde::{Deserialize, Serialize};

/// Common traits for all stored models
pub trait Model: Clone + Send + Sync + 'static {
    /// Entity name used in errors and logs
    const ENTITY: &'static str;

    fn id(&self) -> &str;

    /// Optimistic concurrency token, None for entities updated last-write-wins
    fn version(&self) -> Option<u64> {
        None
    }

    fn bump_version(&mut self) {}
}

impl Model for MissionRun {
    const ENTITY: &'static str = "mission_run";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Model for MissionDefinition {
    const ENTITY: &'static str = "mission_definition";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Model for Source {
    const ENTITY: &'static str = "source";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Model for Robot {
    const ENTITY: &'static str = "robot";

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> Option<u64> {
        Some(self.version)
    }

    fn bump_version(&mut self) {
        self.version += 1;
        self.updated_at = chrono::Utc::now();
    }
}

impl Model for RobotModel {
    const ENTITY: &'static str = "robot_model";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Model for Area {
    const ENTITY: &'static str = "area";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// 1-based page number
    pub fn page(page: usize, per_page: usize) -> Self {
        Self {
            limit: per_page,
            offset: page.saturating_sub(1) * per_page,
        }
    }

    /// Every matching row in one page
    pub fn all() -> Self {
        Self {
            limit: usize::MAX,
            offset: 0,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: usize, pagination: &Pagination) -> Self {
        Self {
            items,
            total,
            limit: pagination.limit,
            offset: pagination.offset,
        }
    }

    /// Slice an already-filtered, ordered collection
    pub fn from_filtered(all: Vec<T>, pagination: &Pagination) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(pagination.offset)
            .take(pagination.limit)
            .collect();
        Self::new(items, total, pagination)
    }

    pub fn has_more(&self) -> bool {
        self.offset.saturating_add(self.limit) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_slices() {
        let result = PaginatedResult::from_filtered((0..10).collect(), &Pagination::page(2, 4));
        assert_eq!(result.items, vec![4, 5, 6, 7]);
        assert_eq!(result.total, 10);
        assert!(result.has_more());

        let last = PaginatedResult::from_filtered((0..10).collect::<Vec<_>>(), &Pagination::page(3, 4));
        assert_eq!(last.items, vec![8, 9]);
        assert!(!last.has_more());
    }

    #[test]
    fn test_all_pages_do_not_overflow() {
        let result = PaginatedResult::from_filtered(vec![1, 2], &Pagination::all());
        assert_eq!(result.items.len(), 2);
        assert!(!result.has_more());
    }
}
