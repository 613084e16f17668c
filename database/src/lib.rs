// Storage layer for MissionHub
// This provides a type-safe, repository-pattern based interface for all persisted entities

pub mod errors;
pub mod memory;
pub mod models;
pub mod repositories;

// Re-export commonly used items
pub use errors::{DatabaseError, DbResult};
pub use memory::MemoryTable;
pub use models::{Model, MissionRunQuery, PaginatedResult, Pagination};
pub use repositories::{
    AreaRepository, MissionDefinitionRepository, MissionRunRepository, Repository, RepositoryManager,
    RobotModelRepository, RobotRepository, SourceRepository,
};
