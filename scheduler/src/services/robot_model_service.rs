use chrono::{Duration, Utc};
use missionhub_database::{MissionRunQuery, MissionRunRepository, Pagination, RobotModelRepository, RobotRepository};
use missionhub_models::{MissionStatus, RobotModel, RobotType};
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::{MissionError, MissionResult};

/// Per-type thresholds and the rolling duration statistic
pub struct RobotModelService {
    models: Arc<dyn RobotModelRepository>,
    robots: Arc<dyn RobotRepository>,
    runs: Arc<dyn MissionRunRepository>,
    window: Duration,
}

impl RobotModelService {
    pub fn new(
        models: Arc<dyn RobotModelRepository>,
        robots: Arc<dyn RobotRepository>,
        runs: Arc<dyn MissionRunRepository>,
        window_days: i64,
    ) -> Self {
        Self {
            models,
            robots,
            runs,
            window: Duration::days(window_days),
        }
    }

    pub async fn get_for_type(&self, robot_type: RobotType) -> MissionResult<RobotModel> {
        self.models
            .find_by_type(robot_type)
            .await?
            .ok_or_else(|| MissionError::not_found("robot_model", robot_type.to_string()))
    }

    /// Recompute the average seconds per task from recent successful runs.
    /// Returns the new value, or None when no run qualified.
    pub async fn update_average_duration_per_tag(&self, robot_type: RobotType) -> MissionResult<Option<f32>> {
        let mut model = self.get_for_type(robot_type).await?;

        let robot_ids: Vec<String> = self
            .robots
            .list(&Pagination::all())
            .await?
            .items
            .into_iter()
            .filter(|robot| robot.robot_type == robot_type)
            .map(|robot| robot.id)
            .collect();
        if robot_ids.is_empty() {
            return Ok(None);
        }

        let query = MissionRunQuery {
            robot_ids,
            ..Default::default()
        }
        .desired_after(Utc::now() - self.window);
        let runs = self.runs.query(&query).await?.items;

        let (total_seconds, total_tasks) = runs
            .iter()
            .filter(|run| run.status() == MissionStatus::Successful)
            .filter_map(|run| run.duration_seconds().map(|seconds| (seconds, run.tasks().len())))
            .fold((0i64, 0usize), |(seconds, tasks), (run_seconds, run_tasks)| {
                (seconds + run_seconds, tasks + run_tasks)
            });

        if total_tasks == 0 {
            debug!("No successful {} runs in window, keeping average", robot_type);
            return Ok(None);
        }

        let average = total_seconds as f32 / total_tasks as f32;
        model.average_duration_per_tag = Some(average);
        self.models.update(&model).await?;
        info!("Average duration per tag for {} is now {:.1}s", robot_type, average);
        Ok(Some(average))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use missionhub_database::{MemoryTable, Repository};
    use missionhub_models::{MissionRun, MissionTask, Pose, Robot};

    struct Fixture {
        service: RobotModelService,
        runs: Arc<MemoryTable<MissionRun>>,
        robot: Robot,
    }

    async fn fixture() -> Fixture {
        let models = Arc::new(MemoryTable::<RobotModel>::new());
        models.create(&RobotModel::new(RobotType::AnymalX)).await.unwrap();
        let robots = Arc::new(MemoryTable::<Robot>::new());
        let robot = robots
            .create(&Robot::new("Nils", RobotType::AnymalX, "HUA"))
            .await
            .unwrap();
        let runs = Arc::new(MemoryTable::<MissionRun>::new());
        Fixture {
            service: RobotModelService::new(models, robots, runs.clone(), 14),
            runs,
            robot,
        }
    }

    fn finished_run(robot: &Robot, task_count: u32, seconds: i64) -> MissionRun {
        ended_run(robot, task_count, seconds, MissionStatus::Successful)
    }

    fn ended_run(robot: &Robot, task_count: u32, seconds: i64, status: MissionStatus) -> MissionRun {
        let tasks = (0..task_count).map(|i| MissionTask::drive_to(i, Pose::default())).collect();
        let mut run = MissionRun::new("route", robot.id.clone(), "HUA", tasks);
        let start = Utc::now() - Duration::hours(1);
        run.update_status(MissionStatus::Ongoing, start).unwrap();
        run.update_status(status, start + Duration::seconds(seconds))
            .unwrap();
        run
    }

    #[tokio::test]
    async fn test_average_over_finished_runs() {
        let f = fixture().await;
        f.runs.create(&finished_run(&f.robot, 2, 100)).await.unwrap();
        f.runs.create(&finished_run(&f.robot, 3, 200)).await.unwrap();
        // unfinished runs do not count
        f.runs
            .create(&MissionRun::new("queued", f.robot.id.clone(), "HUA", Vec::new()))
            .await
            .unwrap();

        let average = f.service.update_average_duration_per_tag(RobotType::AnymalX).await.unwrap();
        assert_eq!(average, Some(60.0));

        let model = f.service.get_for_type(RobotType::AnymalX).await.unwrap();
        assert_eq!(model.average_duration_per_tag, Some(60.0));
    }

    #[tokio::test]
    async fn test_failed_and_cancelled_runs_are_ignored() {
        let f = fixture().await;
        f.runs.create(&finished_run(&f.robot, 2, 100)).await.unwrap();
        f.runs
            .create(&ended_run(&f.robot, 1, 5, MissionStatus::Failed))
            .await
            .unwrap();
        f.runs
            .create(&ended_run(&f.robot, 4, 10, MissionStatus::Cancelled))
            .await
            .unwrap();

        let average = f.service.update_average_duration_per_tag(RobotType::AnymalX).await.unwrap();
        assert_eq!(average, Some(50.0));
    }

    #[tokio::test]
    async fn test_old_runs_leave_statistic_unchanged() {
        let f = fixture().await;
        let old = finished_run(&f.robot, 2, 100).with_desired_start_time(Some(Utc::now() - Duration::days(30)));
        f.runs.create(&old).await.unwrap();

        let average = f.service.update_average_duration_per_tag(RobotType::AnymalX).await.unwrap();
        assert_eq!(average, None);
        let model = f.service.get_for_type(RobotType::AnymalX).await.unwrap();
        assert_eq!(model.average_duration_per_tag, None);
    }

    #[tokio::test]
    async fn test_unknown_model() {
        let f = fixture().await;
        let err = f.service.get_for_type(RobotType::Turtlebot).await.unwrap_err();
        assert!(matches!(err, MissionError::NotFound { entity: "robot_model", .. }));
    }
}
