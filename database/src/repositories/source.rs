use async_trait::async_trait;
use missionhub_models::{Source, SourceType};

use super::Repository;
use crate::errors::DbResult;
use crate::memory::MemoryTable;

#[async_trait]
pub trait SourceRepository: Repository<Source> {
    async fn find_by_source_id(&self, source_type: SourceType, source_id: &str) -> DbResult<Option<Source>>;

    async fn find_by_content_hash(&self, content_hash: &str) -> DbResult<Option<Source>>;
}

#[async_trait]
impl SourceRepository for MemoryTable<Source> {
    async fn find_by_source_id(&self, source_type: SourceType, source_id: &str) -> DbResult<Option<Source>> {
        Ok(self.find(|source| source.source_type == source_type && source.source_id == source_id))
    }

    async fn find_by_content_hash(&self, content_hash: &str) -> DbResult<Option<Source>> {
        Ok(self.find(|source| source.content_hash.as_deref() == Some(content_hash)))
    }
}
