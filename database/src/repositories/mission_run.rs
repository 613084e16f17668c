use async_trait::async_trait;
use missionhub_models::MissionRun;

use super::Repository;
use crate::errors::DbResult;
use crate::memory::MemoryTable;
use crate::models::{MissionRunQuery, PaginatedResult, Pagination};

#[async_trait]
pub trait MissionRunRepository: Repository<MissionRun> {
    /// Runs matching the query, in creation order
    async fn query(&self, query: &MissionRunQuery) -> DbResult<PaginatedResult<MissionRun>>;

    async fn find_by_isar_mission_id(&self, isar_mission_id: &str) -> DbResult<Option<MissionRun>>;
}

#[async_trait]
impl MissionRunRepository for MemoryTable<MissionRun> {
    async fn query(&self, query: &MissionRunQuery) -> DbResult<PaginatedResult<MissionRun>> {
        let runs = self.filter(|run| query.matches(run));
        let pagination = query.pagination.unwrap_or_else(Pagination::all);
        Ok(PaginatedResult::from_filtered(runs, &pagination))
    }

    async fn find_by_isar_mission_id(&self, isar_mission_id: &str) -> DbResult<Option<MissionRun>> {
        Ok(self.find(|run| run.isar_mission_id.as_deref() == Some(isar_mission_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use missionhub_models::{IsarMission, MissionStatus};

    #[tokio::test]
    async fn test_query_by_robot_and_status() {
        let repo = MemoryTable::<MissionRun>::new();
        let first = repo.create(&MissionRun::new("a", "r1", "HUA", Vec::new())).await.unwrap();
        let mut second = MissionRun::new("b", "r1", "HUA", Vec::new());
        second.update_status(MissionStatus::Ongoing, Utc::now()).unwrap();
        repo.create(&second).await.unwrap();
        repo.create(&MissionRun::new("c", "r2", "HUA", Vec::new())).await.unwrap();

        let pending = repo
            .query(&MissionRunQuery::for_robot("r1").with_statuses([MissionStatus::Pending]))
            .await
            .unwrap();
        assert_eq!(pending.total, 1);
        assert_eq!(pending.items[0].id, first.id);

        let all_r1 = repo.query(&MissionRunQuery::for_robot("r1")).await.unwrap();
        assert_eq!(all_r1.total, 2);
    }

    #[tokio::test]
    async fn test_query_pagination() {
        let repo = MemoryTable::<MissionRun>::new();
        for name in ["a", "b", "c"] {
            repo.create(&MissionRun::new(name, "r1", "HUA", Vec::new())).await.unwrap();
        }

        let page = repo
            .query(&MissionRunQuery::default().paginate(Pagination::new(2, 2)))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "c");
    }

    #[tokio::test]
    async fn test_find_by_isar_mission_id() {
        let repo = MemoryTable::<MissionRun>::new();
        let mut run = MissionRun::new("a", "r1", "HUA", Vec::new());
        assert!(run.apply_isar_mission(&IsarMission {
            isar_mission_id: "isar-1".into(),
            tasks: Vec::new(),
        }));
        repo.create(&run).await.unwrap();

        let found = repo.find_by_isar_mission_id("isar-1").await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(run.id));
        assert!(repo.find_by_isar_mission_id("isar-2").await.unwrap().is_none());
    }
}
