use async_trait::async_trait;
use missionhub_models::{Robot, RobotModel, RobotType};

use super::Repository;
use crate::errors::DbResult;
use crate::memory::MemoryTable;

#[async_trait]
pub trait RobotRepository: Repository<Robot> {
    async fn find_by_installation(&self, installation_code: &str) -> DbResult<Vec<Robot>>;

    async fn find_by_isar_id(&self, isar_id: &str) -> DbResult<Option<Robot>>;
}

#[async_trait]
impl RobotRepository for MemoryTable<Robot> {
    async fn find_by_installation(&self, installation_code: &str) -> DbResult<Vec<Robot>> {
        Ok(self.filter(|robot| robot.current_installation_code.eq_ignore_ascii_case(installation_code)))
    }

    async fn find_by_isar_id(&self, isar_id: &str) -> DbResult<Option<Robot>> {
        Ok(self.find(|robot| robot.isar_id == isar_id))
    }
}

#[async_trait]
pub trait RobotModelRepository: Repository<RobotModel> {
    async fn find_by_type(&self, robot_type: RobotType) -> DbResult<Option<RobotModel>>;
}

#[async_trait]
impl RobotModelRepository for MemoryTable<RobotModel> {
    async fn find_by_type(&self, robot_type: RobotType) -> DbResult<Option<RobotModel>> {
        Ok(self.find(|model| model.robot_type == robot_type))
    }
}
