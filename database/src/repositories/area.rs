use async_trait::async_trait;
use missionhub_models::Area;

use super::Repository;
use crate::errors::DbResult;
use crate::memory::MemoryTable;

#[async_trait]
pub trait AreaRepository: Repository<Area> {
    async fn find_by_inspection_area(&self, inspection_area_id: &str) -> DbResult<Vec<Area>>;

    async fn find_by_installation(&self, installation_code: &str) -> DbResult<Vec<Area>>;
}

#[async_trait]
impl AreaRepository for MemoryTable<Area> {
    async fn find_by_inspection_area(&self, inspection_area_id: &str) -> DbResult<Vec<Area>> {
        Ok(self.filter(|area| area.inspection_area_id == inspection_area_id))
    }

    async fn find_by_installation(&self, installation_code: &str) -> DbResult<Vec<Area>> {
        Ok(self.filter(|area| area.installation_code.eq_ignore_ascii_case(installation_code)))
    }
}
