use chrono::Utc;
use missionhub_database::{MissionRunQuery, MissionRunRepository, PaginatedResult};
use missionhub_models::{
    InspectionStatus, Lifecycle, MissionRun, MissionRunPriority, MissionRunType, MissionStatus, Robot, TaskStatus,
};
use missionhub_observability::{log_mission_run_orphaned, log_mission_run_status_changed};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::{MissionError, MissionResult};

const NON_TERMINAL: [MissionStatus; 3] = [MissionStatus::Pending, MissionStatus::Ongoing, MissionStatus::Paused];

/// Reads and status writes for mission runs
pub struct MissionRunService {
    runs: Arc<dyn MissionRunRepository>,
    service_name: String,
}

impl MissionRunService {
    pub fn new(runs: Arc<dyn MissionRunRepository>, service_name: impl Into<String>) -> Self {
        Self {
            runs,
            service_name: service_name.into(),
        }
    }

    pub async fn create(&self, run: &MissionRun) -> MissionResult<MissionRun> {
        Ok(self.runs.create(run).await?)
    }

    pub async fn save(&self, run: &MissionRun) -> MissionResult<MissionRun> {
        Ok(self.runs.update(run).await?)
    }

    pub async fn get(&self, run_id: &str) -> MissionResult<MissionRun> {
        self.runs
            .find_by_id(run_id)
            .await?
            .ok_or_else(|| MissionError::not_found("mission_run", run_id))
    }

    pub async fn get_by_isar_mission_id(&self, isar_mission_id: &str) -> MissionResult<MissionRun> {
        self.runs
            .find_by_isar_mission_id(isar_mission_id)
            .await?
            .ok_or_else(|| MissionError::not_found("mission_run", isar_mission_id))
    }

    pub async fn query(&self, query: &MissionRunQuery) -> MissionResult<PaginatedResult<MissionRun>> {
        Ok(self.runs.query(query).await?)
    }

    pub async fn delete(&self, run_id: &str) -> MissionResult<()> {
        if !self.runs.delete(run_id).await? {
            return Err(MissionError::not_found("mission_run", run_id));
        }
        Ok(())
    }

    /// Move a run to `status`. Setting the current status again is a no-op
    /// apart from the single-write timestamps.
    pub async fn update_status(
        &self,
        run_id: &str,
        status: MissionStatus,
        reason: Option<String>,
    ) -> MissionResult<MissionRun> {
        let mut run = self.get(run_id).await?;
        let previous = run.status();
        run.update_status(status, Utc::now())?;
        if reason.is_some() {
            run.status_reason = reason;
        }
        let run = self.save(&run).await?;

        if previous != status {
            log_mission_run_status_changed(&self.service_name, &run.id, &run.robot_id, &format!("{:?}", status));
        }
        Ok(run)
    }

    /// Apply a robot-control task update, matched on the ISAR task id
    pub async fn update_task_status(
        &self,
        isar_mission_id: &str,
        isar_task_id: &str,
        status: TaskStatus,
    ) -> MissionResult<MissionRun> {
        let mut run = self.get_by_isar_mission_id(isar_mission_id).await?;
        let task = run
            .task_by_isar_id_mut(isar_task_id)
            .ok_or_else(|| MissionError::not_found("mission_task", isar_task_id))?;
        task.update_status(status, Utc::now())?;
        debug!("Task {} of run {} is now {:?}", isar_task_id, run.id, status);
        self.save(&run).await
    }

    pub async fn update_inspection_status(
        &self,
        isar_mission_id: &str,
        isar_inspection_id: &str,
        status: InspectionStatus,
    ) -> MissionResult<MissionRun> {
        let mut run = self.get_by_isar_mission_id(isar_mission_id).await?;
        let inspection = run
            .inspection_by_isar_id_mut(isar_inspection_id)
            .ok_or_else(|| MissionError::not_found("inspection", isar_inspection_id))?;
        inspection.update_status(status, Utc::now())?;
        self.save(&run).await
    }

    /// Fail a stale active run that is being replaced on its robot.
    /// Only the stored status changes; the robot is not told to stop.
    pub async fn orphan(&self, run_id: &str, replaced_by: &str) -> MissionResult<Option<MissionRun>> {
        let run = match self.runs.find_by_id(run_id).await? {
            Some(run) => run,
            None => {
                warn!("Robot pointed at missing run {}, nothing to orphan", run_id);
                return Ok(None);
            }
        };
        if run.status().is_terminal() {
            return Ok(None);
        }

        let run = self
            .update_status(
                run_id,
                MissionStatus::Failed,
                Some(format!("Orphaned: replaced by run {}", replaced_by)),
            )
            .await?;
        log_mission_run_orphaned(&self.service_name, &run.id, &run.robot_id, replaced_by);
        Ok(Some(run))
    }

    /// Next queued run for the robot.
    ///
    /// A frozen queue only releases emergency-priority runs. Order is highest
    /// priority, then earliest desired start, then creation order.
    pub async fn next_run_for_robot(&self, robot: &Robot) -> MissionResult<Option<MissionRun>> {
        let pending = self
            .runs
            .query(&MissionRunQuery::for_robot(robot.id.clone()).with_statuses([MissionStatus::Pending]))
            .await?
            .items;

        let mut eligible: Vec<MissionRun> = pending
            .into_iter()
            .filter(|run| !robot.mission_queue_frozen || run.priority == MissionRunPriority::Emergency)
            .collect();
        eligible.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.desired_start_time.cmp(&b.desired_start_time))
        });
        Ok(eligible.into_iter().next())
    }

    pub async fn active_emergency_run(&self, robot_id: &str) -> MissionResult<Option<MissionRun>> {
        let runs = self
            .runs
            .query(
                &MissionRunQuery::for_robot(robot_id)
                    .with_statuses(NON_TERMINAL)
                    .with_run_types([MissionRunType::Emergency]),
            )
            .await?;
        Ok(runs.items.into_iter().next())
    }
}
