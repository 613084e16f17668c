// Repository pattern for storage operations

pub mod area;
pub mod mission_definition;
pub mod mission_run;
pub mod robot;
pub mod source;

pub use area::AreaRepository;
pub use mission_definition::MissionDefinitionRepository;
pub use mission_run::MissionRunRepository;
pub use robot::{RobotModelRepository, RobotRepository};
pub use source::SourceRepository;

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::DbResult;
use crate::memory::MemoryTable;
use crate::models::{Model, PaginatedResult, Pagination};

/// Base repository trait with common CRUD operations
#[async_trait]
pub trait Repository<T: Model>: Send + Sync {
    /// Create a new entity
    async fn create(&self, entity: &T) -> DbResult<T>;

    /// Find entity by ID
    async fn find_by_id(&self, id: &str) -> DbResult<Option<T>>;

    /// Update an existing entity, returning the stored copy
    async fn update(&self, entity: &T) -> DbResult<T>;

    /// Delete an entity by ID
    async fn delete(&self, id: &str) -> DbResult<bool>;

    /// List all entities with pagination
    async fn list(&self, pagination: &Pagination) -> DbResult<PaginatedResult<T>>;
}

#[async_trait]
impl<T: Model> Repository<T> for MemoryTable<T> {
    async fn create(&self, entity: &T) -> DbResult<T> {
        self.insert(entity)
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<T>> {
        Ok(self.get(id))
    }

    async fn update(&self, entity: &T) -> DbResult<T> {
        self.replace(entity)
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        Ok(self.remove(id))
    }

    async fn list(&self, pagination: &Pagination) -> DbResult<PaginatedResult<T>> {
        Ok(self.page(pagination))
    }
}

/// Repository manager that provides access to all repositories
#[derive(Clone)]
pub struct RepositoryManager {
    pub mission_runs: Arc<dyn MissionRunRepository>,
    pub mission_definitions: Arc<dyn MissionDefinitionRepository>,
    pub sources: Arc<dyn SourceRepository>,
    pub robots: Arc<dyn RobotRepository>,
    pub robot_models: Arc<dyn RobotModelRepository>,
    pub areas: Arc<dyn AreaRepository>,
}

impl RepositoryManager {
    /// Every repository backed by an in-process table
    pub fn in_memory() -> Self {
        Self {
            mission_runs: Arc::new(MemoryTable::new()),
            mission_definitions: Arc::new(MemoryTable::new()),
            sources: Arc::new(MemoryTable::new()),
            robots: Arc::new(MemoryTable::new()),
            robot_models: Arc::new(MemoryTable::new()),
            areas: Arc::new(MemoryTable::new()),
        }
    }

    pub fn mission_runs(&self) -> Arc<dyn MissionRunRepository> {
        self.mission_runs.clone()
    }

    pub fn mission_definitions(&self) -> Arc<dyn MissionDefinitionRepository> {
        self.mission_definitions.clone()
    }

    pub fn sources(&self) -> Arc<dyn SourceRepository> {
        self.sources.clone()
    }

    pub fn robots(&self) -> Arc<dyn RobotRepository> {
        self.robots.clone()
    }

    pub fn robot_models(&self) -> Arc<dyn RobotModelRepository> {
        self.robot_models.clone()
    }

    pub fn areas(&self) -> Arc<dyn AreaRepository> {
        self.areas.clone()
    }
}
