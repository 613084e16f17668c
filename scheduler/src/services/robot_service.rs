use missionhub_database::{DatabaseError, RobotRepository};
use missionhub_models::{Robot, RobotStatus};
use missionhub_observability::{log_retry, log_robot_offline};
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::{MissionError, MissionResult};

/// Owner of every write to the robot aggregate
pub struct RobotService {
    robots: Arc<dyn RobotRepository>,
    max_attempts: u32,
    service_name: String,
}

impl RobotService {
    pub fn new(robots: Arc<dyn RobotRepository>, max_attempts: u32, service_name: impl Into<String>) -> Self {
        Self {
            robots,
            max_attempts: max_attempts.max(1),
            service_name: service_name.into(),
        }
    }

    pub async fn get(&self, robot_id: &str) -> MissionResult<Robot> {
        self.robots
            .find_by_id(robot_id)
            .await?
            .ok_or_else(|| MissionError::not_found("robot", robot_id))
    }

    pub async fn find_by_installation(&self, installation_code: &str) -> MissionResult<Vec<Robot>> {
        Ok(self.robots.find_by_installation(installation_code).await?)
    }

    /// Re-read, mutate and compare-and-swap the robot, retrying on version conflicts
    pub async fn update_robot<F>(&self, robot_id: &str, mutation: F) -> MissionResult<Robot>
    where
        F: Fn(&mut Robot) + Send + Sync,
    {
        let mut attempt = 1;
        loop {
            let mut robot = self.get(robot_id).await?;
            mutation(&mut robot);

            match self.robots.update(&robot).await {
                Ok(stored) => return Ok(stored),
                Err(err @ DatabaseError::VersionConflict { .. }) if attempt < self.max_attempts => {
                    log_retry!("update_robot", attempt, self.max_attempts, err);
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Returns the robot and whether the flag actually changed
    pub async fn set_queue_frozen(&self, robot_id: &str, frozen: bool) -> MissionResult<(Robot, bool)> {
        let robot = self.get(robot_id).await?;
        if robot.mission_queue_frozen == frozen {
            debug!("Queue of robot {} already {}", robot_id, if frozen { "frozen" } else { "open" });
            return Ok((robot, false));
        }

        let robot = self
            .update_robot(robot_id, |robot| robot.mission_queue_frozen = frozen)
            .await?;
        info!("Mission queue of robot {} {}", robot_id, if frozen { "frozen" } else { "unfrozen" });
        Ok((robot, true))
    }

    /// Robot-control unreachable: take the robot out of rotation
    pub async fn mark_offline(&self, robot_id: &str, reason: &str) -> MissionResult<Robot> {
        let robot = self
            .update_robot(robot_id, |robot| {
                robot.mark_offline();
                robot.current_mission_id = None;
            })
            .await?;
        log_robot_offline(&self.service_name, robot_id, reason);
        Ok(robot)
    }

    pub async fn assign_mission(&self, robot_id: &str, run_id: &str) -> MissionResult<Robot> {
        self.update_robot(robot_id, |robot| {
            robot.status = RobotStatus::Busy;
            robot.current_mission_id = Some(run_id.to_string());
        })
        .await
    }

    /// Clear the current mission if it is still `run_id`; offline robots stay offline
    pub async fn release_mission(&self, robot_id: &str, run_id: &str) -> MissionResult<Robot> {
        self.update_robot(robot_id, |robot| {
            if robot.current_mission_id.as_deref() == Some(run_id) {
                robot.current_mission_id = None;
                if robot.status != RobotStatus::Offline {
                    robot.status = RobotStatus::Available;
                }
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use missionhub_database::{DbResult, MemoryTable, PaginatedResult, Pagination, Repository};
    use missionhub_models::RobotType;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Store that reports a conflict for the first `conflicts` writes
    struct Contended {
        inner: MemoryTable<Robot>,
        conflicts: AtomicU32,
    }

    #[async_trait]
    impl Repository<Robot> for Contended {
        async fn create(&self, entity: &Robot) -> DbResult<Robot> {
            self.inner.create(entity).await
        }

        async fn find_by_id(&self, id: &str) -> DbResult<Option<Robot>> {
            self.inner.find_by_id(id).await
        }

        async fn update(&self, entity: &Robot) -> DbResult<Robot> {
            if self.conflicts.load(Ordering::SeqCst) > 0 {
                self.conflicts.fetch_sub(1, Ordering::SeqCst);
                return Err(DatabaseError::VersionConflict {
                    entity: "robot",
                    id: entity.id.clone(),
                    expected: entity.version,
                    found: entity.version + 1,
                });
            }
            self.inner.update(entity).await
        }

        async fn delete(&self, id: &str) -> DbResult<bool> {
            self.inner.delete(id).await
        }

        async fn list(&self, pagination: &Pagination) -> DbResult<PaginatedResult<Robot>> {
            self.inner.list(pagination).await
        }
    }

    #[async_trait]
    impl RobotRepository for Contended {
        async fn find_by_installation(&self, installation_code: &str) -> DbResult<Vec<Robot>> {
            self.inner.find_by_installation(installation_code).await
        }

        async fn find_by_isar_id(&self, isar_id: &str) -> DbResult<Option<Robot>> {
            self.inner.find_by_isar_id(isar_id).await
        }
    }

    async fn service_with_conflicts(conflicts: u32, max_attempts: u32) -> (RobotService, Robot) {
        let repo = Contended {
            inner: MemoryTable::new(),
            conflicts: AtomicU32::new(conflicts),
        };
        let robot = repo.create(&Robot::new("Nils", RobotType::AnymalX, "HUA")).await.unwrap();
        (RobotService::new(Arc::new(repo), max_attempts, "test"), robot)
    }

    #[tokio::test]
    async fn test_update_retries_on_conflict() {
        let (service, robot) = service_with_conflicts(2, 3).await;
        let updated = service
            .update_robot(&robot.id, |r| r.battery_level = Some(55.0))
            .await
            .unwrap();
        assert_eq!(updated.battery_level, Some(55.0));
        assert_eq!(updated.version, robot.version + 1);
    }

    #[tokio::test]
    async fn test_update_surfaces_conflict_after_retries() {
        let (service, robot) = service_with_conflicts(5, 3).await;
        let err = service
            .update_robot(&robot.id, |r| r.battery_level = Some(55.0))
            .await
            .unwrap_err();
        assert!(matches!(err, MissionError::Database(DatabaseError::VersionConflict { .. })));
    }

    #[tokio::test]
    async fn test_freeze_is_idempotent() {
        let (service, robot) = service_with_conflicts(0, 3).await;

        let (frozen, changed) = service.set_queue_frozen(&robot.id, true).await.unwrap();
        assert!(frozen.mission_queue_frozen);
        assert!(changed);

        let (frozen, changed) = service.set_queue_frozen(&robot.id, true).await.unwrap();
        assert!(frozen.mission_queue_frozen);
        assert!(!changed);
    }

    #[tokio::test]
    async fn test_release_keeps_offline_status() {
        let (service, robot) = service_with_conflicts(0, 3).await;
        service.assign_mission(&robot.id, "run-1").await.unwrap();
        service
            .update_robot(&robot.id, |r| r.status = RobotStatus::Offline)
            .await
            .unwrap();

        let released = service.release_mission(&robot.id, "run-1").await.unwrap();
        assert_eq!(released.current_mission_id, None);
        assert_eq!(released.status, RobotStatus::Offline);
    }

    #[tokio::test]
    async fn test_release_ignores_other_runs() {
        let (service, robot) = service_with_conflicts(0, 3).await;
        service.assign_mission(&robot.id, "run-2").await.unwrap();

        let robot = service.release_mission(&robot.id, "run-1").await.unwrap();
        assert_eq!(robot.current_mission_id.as_deref(), Some("run-2"));
        assert_eq!(robot.status, RobotStatus::Busy);
    }

    #[tokio::test]
    async fn test_missing_robot() {
        let (service, _) = service_with_conflicts(0, 3).await;
        let err = service.get("nope").await.unwrap_err();
        assert!(matches!(err, MissionError::NotFound { entity: "robot", .. }));
    }
}
