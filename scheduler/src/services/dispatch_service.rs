use missionhub_models::{
    InspectionStatus, IsarMissionStatus, IsarTaskStatus, Lifecycle, MissionRun, MissionRunPriority, MissionRunType,
    MissionStatus, MissionTask, Pose, Robot, RobotStatus,
};
use missionhub_observability::{log_mission_run_failed, log_mission_run_finished, log_robot_control_call};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::mission_definition_service::MissionDefinitionService;
use super::mission_run_service::MissionRunService;
use super::robot_model_service::RobotModelService;
use super::robot_service::RobotService;
use crate::clients::{RobotControlClient, RobotControlError};
use crate::errors::{AdmissionRejection, MissionError, MissionResult};

/// Starts queued runs on robots and ingests robot-control progress
pub struct DispatchService {
    robots: Arc<RobotService>,
    runs: Arc<MissionRunService>,
    definitions: Arc<MissionDefinitionService>,
    robot_models: Arc<RobotModelService>,
    robot_control: Arc<dyn RobotControlClient>,
    service_name: String,
}

impl DispatchService {
    pub fn new(
        robots: Arc<RobotService>,
        runs: Arc<MissionRunService>,
        definitions: Arc<MissionDefinitionService>,
        robot_models: Arc<RobotModelService>,
        robot_control: Arc<dyn RobotControlClient>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            robots,
            runs,
            definitions,
            robot_models,
            robot_control,
            service_name: service_name.into(),
        }
    }

    /// Start the robot's next eligible run if it is free to take one
    pub async fn start_next_mission_run(&self, robot_id: &str) -> MissionResult<Option<MissionRun>> {
        let robot = self.robots.get(robot_id).await?;
        if !robot.is_available_for_dispatch() {
            debug!("Robot {} is {:?}, not dispatching", robot.name, robot.status);
            return Ok(None);
        }

        match self.runs.next_run_for_robot(&robot).await? {
            Some(run) => Ok(Some(self.launch(robot, run).await?)),
            None => {
                debug!("No eligible run queued for robot {}", robot.name);
                Ok(None)
            }
        }
    }

    /// Start a specific pending run, orphaning whatever the robot was doing.
    ///
    /// A frozen queue only lets emergency-priority runs through.
    pub async fn start_mission_run(&self, robot_id: &str, run_id: &str) -> MissionResult<MissionRun> {
        let robot = self.robots.get(robot_id).await?;
        let run = self.runs.get(run_id).await?;
        if robot.mission_queue_frozen && run.priority != MissionRunPriority::Emergency {
            return Err(AdmissionRejection::MissionQueueFrozen { robot_id: robot.id }.into());
        }
        self.launch(robot, run).await
    }

    /// Create a localization run at `pose` and start it. Localization runs
    /// belong to no mission definition.
    pub async fn start_localization(&self, robot_id: &str, pose: Pose) -> MissionResult<MissionRun> {
        let robot = self.robots.get(robot_id).await?;
        let run = MissionRun::new(
            "Localization",
            robot.id.clone(),
            robot.current_installation_code.clone(),
            vec![MissionTask::localization(pose)],
        )
        .with_run_type(MissionRunType::Localization)
        .with_inspection_area(robot.current_area_id.clone());
        let run = self.runs.create(&run).await?;
        self.launch(robot, run).await
    }

    /// Stop the current run. A 409 from the robot means it was already idle.
    pub async fn stop_current_mission(&self, robot_id: &str) -> MissionResult<Option<MissionRun>> {
        let robot = self.robots.get(robot_id).await?;

        let started = Instant::now();
        match self.robot_control.stop_mission(&robot).await {
            Ok(()) => {
                log_robot_control_call!("stop_mission", robot.id, elapsed_ms(started), "ok");
            }
            Err(err) if err.is_conflict() => {
                debug!("Robot {} already idle: {}", robot.name, err);
            }
            Err(err) if err.is_connectivity() => {
                return Err(self.handle_control_failure(&robot, robot.current_mission_id.as_deref(), err).await)
            }
            Err(err) => return Err(rejected_by_robot(&robot, "stop_mission", err)),
        }

        let Some(run_id) = robot.current_mission_id.clone() else {
            return Ok(None);
        };
        let run = self.runs.get(&run_id).await?;
        if run.status().is_terminal() {
            self.robots.release_mission(&robot.id, &run_id).await?;
            return Ok(None);
        }

        let run = self
            .runs
            .update_status(&run_id, MissionStatus::Cancelled, Some("Stopped by operator".to_string()))
            .await?;
        self.complete_run(&run).await?;
        Ok(Some(run))
    }

    pub async fn pause_current_mission(&self, robot_id: &str) -> MissionResult<MissionRun> {
        let (robot, run_id) = self.robot_with_current_run(robot_id).await?;

        let started = Instant::now();
        match self.robot_control.pause_mission(&robot).await {
            Ok(()) => {}
            Err(err) if err.is_connectivity() => {
                return Err(self.handle_control_failure(&robot, Some(&run_id), err).await)
            }
            Err(err) => return Err(rejected_by_robot(&robot, "pause_mission", err)),
        }
        log_robot_control_call!("pause_mission", robot.id, elapsed_ms(started), "ok");

        self.runs.update_status(&run_id, MissionStatus::Paused, None).await
    }

    pub async fn resume_current_mission(&self, robot_id: &str) -> MissionResult<MissionRun> {
        let (robot, run_id) = self.robot_with_current_run(robot_id).await?;

        let started = Instant::now();
        match self.robot_control.resume_mission(&robot).await {
            Ok(()) => {}
            Err(err) if err.is_connectivity() => {
                return Err(self.handle_control_failure(&robot, Some(&run_id), err).await)
            }
            Err(err) => return Err(rejected_by_robot(&robot, "resume_mission", err)),
        }
        log_robot_control_call!("resume_mission", robot.id, elapsed_ms(started), "ok");

        self.runs.update_status(&run_id, MissionStatus::Ongoing, None).await
    }

    /// Mission status reported by the robot; terminal statuses free the robot
    pub async fn handle_mission_status(
        &self,
        robot_id: &str,
        isar_mission_id: &str,
        status: IsarMissionStatus,
    ) -> MissionResult<MissionRun> {
        let run = self.runs.get_by_isar_mission_id(isar_mission_id).await?;
        if run.robot_id != robot_id {
            return Err(MissionError::InvariantViolation(format!(
                "run {} belongs to robot {}, not {}",
                run.id, run.robot_id, robot_id
            )));
        }

        let status = MissionStatus::from(status);
        if run.status() == status {
            return Ok(run);
        }

        let run = self.runs.update_status(&run.id, status, None).await?;
        if run.status().is_terminal() {
            self.complete_run(&run).await?;
        }
        Ok(run)
    }

    pub async fn handle_task_status(
        &self,
        isar_mission_id: &str,
        isar_task_id: &str,
        status: IsarTaskStatus,
    ) -> MissionResult<MissionRun> {
        self.runs
            .update_task_status(isar_mission_id, isar_task_id, status.into())
            .await
    }

    pub async fn handle_inspection_status(
        &self,
        isar_mission_id: &str,
        isar_inspection_id: &str,
        status: InspectionStatus,
    ) -> MissionResult<MissionRun> {
        self.runs
            .update_inspection_status(isar_mission_id, isar_inspection_id, status)
            .await
    }

    async fn launch(&self, robot: Robot, mut run: MissionRun) -> MissionResult<MissionRun> {
        if run.robot_id != robot.id {
            return Err(MissionError::InvariantViolation(format!(
                "run {} belongs to robot {}, not {}",
                run.id, run.robot_id, robot.id
            )));
        }
        if run.status() != MissionStatus::Pending {
            return Err(MissionError::InvariantViolation(format!(
                "run {} is {:?}; only pending runs can be started",
                run.id,
                run.status()
            )));
        }

        if let Some(current) = robot.current_mission_id.as_deref() {
            if current != run.id {
                match self.runs.orphan(current, &run.id).await? {
                    Some(orphaned) => self.complete_run(&orphaned).await?,
                    None => {
                        self.robots.release_mission(&robot.id, current).await?;
                    }
                }
            }
        }

        let started = Instant::now();
        log_robot_control_call!("start_mission", robot.id);
        let result = match (run.mission_run_type, run.tasks().first()) {
            (MissionRunType::Localization, Some(task)) => {
                self.robot_control
                    .start_localization_mission(&robot, &task.robot_pose)
                    .await
            }
            _ => self.robot_control.start_mission(&robot, &run).await,
        };

        let isar_mission = match result {
            Ok(isar_mission) => isar_mission,
            Err(err) => return Err(self.handle_control_failure(&robot, Some(&run.id), err).await),
        };
        log_robot_control_call!("start_mission", robot.id, elapsed_ms(started), "ok");

        if !run.apply_isar_mission(&isar_mission) {
            let err = RobotControlError::MalformedResponse(format!(
                "expected {} tasks, robot reported {}",
                run.tasks().len(),
                isar_mission.tasks.len()
            ));
            return Err(self.handle_control_failure(&robot, Some(&run.id), err).await);
        }
        self.runs.save(&run).await?;

        let run = self.runs.update_status(&run.id, MissionStatus::Ongoing, None).await?;
        self.robots.assign_mission(&robot.id, &run.id).await?;
        info!("🚀 Started run {} ({}) on robot {}", run.id, run.name, robot.name);
        Ok(run)
    }

    /// Fail the affected run; connectivity failures also take the robot offline
    async fn handle_control_failure(&self, robot: &Robot, run_id: Option<&str>, err: RobotControlError) -> MissionError {
        warn!("Robot control call for {} failed: {}", robot.name, err);

        if let Some(run_id) = run_id {
            if let Err(update_err) = self.fail_run(run_id, &robot.id, &err.to_string()).await {
                warn!("Could not fail run {}: {}", run_id, update_err);
            }
        }

        if err.is_connectivity() {
            if let Err(update_err) = self.robots.mark_offline(&robot.id, &err.to_string()).await {
                warn!("Could not mark robot {} offline: {}", robot.id, update_err);
            }
        }

        MissionError::RobotControl(err)
    }

    async fn fail_run(&self, run_id: &str, robot_id: &str, reason: &str) -> MissionResult<()> {
        let run = self.runs.get(run_id).await?;
        if run.status().is_terminal() {
            return Ok(());
        }
        let run = self
            .runs
            .update_status(run_id, MissionStatus::Failed, Some(reason.to_string()))
            .await?;
        log_mission_run_failed(&self.service_name, &run.id, robot_id, reason);
        self.complete_run(&run).await
    }

    /// Bookkeeping once a run reached a terminal status
    async fn complete_run(&self, run: &MissionRun) -> MissionResult<()> {
        let robot = self.robots.release_mission(&run.robot_id, &run.id).await?;
        log_mission_run_finished(&self.service_name, &run.id, &robot.id, &format!("{:?}", run.status()));

        if run.status() == MissionStatus::Successful {
            if let Some(definition_id) = run.mission_id.as_deref() {
                match self.definitions.record_successful_run(definition_id, &run.id).await {
                    Ok(_) => {}
                    Err(MissionError::NotFound { .. }) => {
                        debug!("Definition {} is gone, skipping last successful run", definition_id)
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        if let Err(err) = self.robot_models.update_average_duration_per_tag(robot.robot_type).await {
            warn!("Could not refresh duration statistic for {}: {}", robot.robot_type, err);
        }
        Ok(())
    }

    async fn robot_with_current_run(&self, robot_id: &str) -> MissionResult<(Robot, String)> {
        let robot = self.robots.get(robot_id).await?;
        if robot.status == RobotStatus::Offline {
            return Err(MissionError::InvariantViolation(format!("robot {} is offline", robot.name)));
        }
        let run_id = robot
            .current_mission_id
            .clone()
            .ok_or_else(|| MissionError::not_found("mission_run", format!("current run of robot {}", robot_id)))?;
        Ok((robot, run_id))
    }
}

/// The robot answered but refused; run and robot keep their state
fn rejected_by_robot(robot: &Robot, call: &str, err: RobotControlError) -> MissionError {
    warn!("Robot {} refused {}: {}", robot.name, call, err);
    MissionError::RobotControl(err)
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
