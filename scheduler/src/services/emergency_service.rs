use missionhub_database::AreaRepository;
use missionhub_models::{
    Area, Lifecycle, MissionRun, MissionRunPriority, MissionRunType, MissionTask, Robot,
};
use missionhub_observability::log_emergency_event;
use std::sync::Arc;
use tracing::{info, warn};

use super::dispatch_service::DispatchService;
use super::mission_run_service::MissionRunService;
use super::robot_service::RobotService;
use crate::errors::{MissionError, MissionResult};
use crate::events::{EventPublisher, MissionEvent};

const SAFE_POSITION_RUN_NAME: &str = "Drive to Safe Position";

/// What a button event did to one robot
#[derive(Debug, Clone)]
pub struct EmergencyOutcome {
    pub robot_id: String,
    pub area_id: String,
    /// False when the queue was already in the requested state
    pub queue_changed: bool,
    pub stopped_run: Option<MissionRun>,
    pub safe_position_run: Option<MissionRun>,
}

/// Emergency stop and return-to-safe-position handling
pub struct EmergencyService {
    robots: Arc<RobotService>,
    runs: Arc<MissionRunService>,
    areas: Arc<dyn AreaRepository>,
    dispatch: Arc<DispatchService>,
    events: Arc<dyn EventPublisher>,
    service_name: String,
}

impl EmergencyService {
    pub fn new(
        robots: Arc<RobotService>,
        runs: Arc<MissionRunService>,
        areas: Arc<dyn AreaRepository>,
        dispatch: Arc<DispatchService>,
        events: Arc<dyn EventPublisher>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            robots,
            runs,
            areas,
            dispatch,
            events,
            service_name: service_name.into(),
        }
    }

    /// Freeze the queue, abort the current run and send the robot to the
    /// closest safe position of the area. Readiness checks do not apply.
    pub async fn emergency_button_pressed(&self, robot_id: &str, area_id: &str) -> MissionResult<EmergencyOutcome> {
        let robot = self.robots.get(robot_id).await?;
        let area = self.get_area(area_id).await?;

        self.events.publish(MissionEvent::EmergencyButtonPressedForRobot {
            robot_id: robot.id.clone(),
            area_id: area.id.clone(),
        });

        let (robot, queue_changed) = self.robots.set_queue_frozen(&robot.id, true).await?;
        log_emergency_event(&self.service_name, "emergency_button_pressed", &robot.id, &area.id, queue_changed);

        let stopped_run = self.abort_current_run(&robot).await?;

        if let Some(existing) = self.runs.active_emergency_run(&robot.id).await? {
            info!("Robot {} already has safe-position run {}", robot.name, existing.id);
            return Ok(EmergencyOutcome {
                robot_id: robot.id,
                area_id: area.id,
                queue_changed,
                stopped_run,
                safe_position_run: None,
            });
        }

        let robot = self.robots.get(&robot.id).await?;
        let run = self.runs.create(&safe_position_run(&robot, &area)?).await?;
        info!("🚨 Sending robot {} to a safe position in {}", robot.name, area.name);
        let run = self.dispatch.start_mission_run(&robot.id, &run.id).await?;

        Ok(EmergencyOutcome {
            robot_id: robot.id,
            area_id: area.id,
            queue_changed,
            stopped_run,
            safe_position_run: Some(run),
        })
    }

    /// Unfreeze the queue; nothing is resumed
    pub async fn emergency_button_depressed(&self, robot_id: &str, area_id: &str) -> MissionResult<EmergencyOutcome> {
        let robot = self.robots.get(robot_id).await?;
        let area = self.get_area(area_id).await?;

        self.events.publish(MissionEvent::EmergencyButtonDepressedForRobot {
            robot_id: robot.id.clone(),
            area_id: area.id.clone(),
        });

        let (robot, queue_changed) = self.robots.set_queue_frozen(&robot.id, false).await?;
        log_emergency_event(&self.service_name, "emergency_button_depressed", &robot.id, &area.id, queue_changed);

        Ok(EmergencyOutcome {
            robot_id: robot.id,
            area_id: area.id,
            queue_changed,
            stopped_run: None,
            safe_position_run: None,
        })
    }

    /// Press for every robot at the installation that has a current area
    pub async fn emergency_button_pressed_for_installation(
        &self,
        installation_code: &str,
    ) -> MissionResult<Vec<(String, MissionResult<EmergencyOutcome>)>> {
        let mut outcomes = Vec::new();
        for (robot_id, area_id) in self.robots_with_area(installation_code).await? {
            let outcome = self.emergency_button_pressed(&robot_id, &area_id).await;
            if let Err(err) = &outcome {
                warn!("Emergency press for robot {} failed: {}", robot_id, err);
            }
            outcomes.push((robot_id, outcome));
        }
        Ok(outcomes)
    }

    pub async fn emergency_button_depressed_for_installation(
        &self,
        installation_code: &str,
    ) -> MissionResult<Vec<(String, MissionResult<EmergencyOutcome>)>> {
        let mut outcomes = Vec::new();
        for (robot_id, area_id) in self.robots_with_area(installation_code).await? {
            let outcome = self.emergency_button_depressed(&robot_id, &area_id).await;
            if let Err(err) = &outcome {
                warn!("Emergency release for robot {} failed: {}", robot_id, err);
            }
            outcomes.push((robot_id, outcome));
        }
        Ok(outcomes)
    }

    /// Stop the current run unless it is already an emergency run
    async fn abort_current_run(&self, robot: &Robot) -> MissionResult<Option<MissionRun>> {
        let Some(run_id) = robot.current_mission_id.as_deref() else {
            return Ok(None);
        };
        let current = self.runs.get(run_id).await?;
        if current.is_emergency() || current.status().is_terminal() {
            return Ok(None);
        }
        self.dispatch.stop_current_mission(&robot.id).await
    }

    async fn robots_with_area(&self, installation_code: &str) -> MissionResult<Vec<(String, String)>> {
        Ok(self
            .robots
            .find_by_installation(installation_code)
            .await?
            .into_iter()
            .filter_map(|robot| robot.current_area_id.map(|area_id| (robot.id, area_id)))
            .collect())
    }

    async fn get_area(&self, area_id: &str) -> MissionResult<Area> {
        self.areas
            .find_by_id(area_id)
            .await?
            .ok_or_else(|| MissionError::not_found("area", area_id))
    }
}

/// Single drive-to task towards the safe position closest to the robot
fn safe_position_run(robot: &Robot, area: &Area) -> MissionResult<MissionRun> {
    let pose = robot
        .pose
        .as_ref()
        .ok_or_else(|| MissionError::InvariantViolation(format!("pose of robot {} is unknown", robot.name)))?;
    let safe_position = area.closest_safe_position(&pose.position).ok_or_else(|| {
        MissionError::InvariantViolation(format!("area {} has no safe positions", area.name))
    })?;

    Ok(MissionRun::new(
        SAFE_POSITION_RUN_NAME,
        robot.id.clone(),
        area.installation_code.clone(),
        vec![MissionTask::drive_to(0, safe_position.pose.clone())],
    )
    .with_run_type(MissionRunType::Emergency)
    .with_priority(MissionRunPriority::Emergency)
    .with_inspection_area(Some(area.inspection_area_id.clone())))
}
