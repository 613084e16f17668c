use chrono::{DateTime, Utc};
use missionhub_models::{
    clone_task_for_rerun, DefinitionTemplate, MissionRun, MissionTask, PressureCheck, Robot, RobotModel,
};
use missionhub_observability::{log_admission_check, log_admission_rejected, log_mission_run_scheduled};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use validator::Validate;

use super::duration_estimator::estimate_duration;
use super::mission_definition_service::MissionDefinitionService;
use super::mission_run_service::MissionRunService;
use super::robot_model_service::RobotModelService;
use super::robot_service::RobotService;
use super::source_service::SourceService;
use crate::clients::{EchoMissionProvider, MapSelector, MissionSource, TagAreaResolver};
use crate::errors::{AdmissionRejection, MissionError, MissionResult};

/// Schedule an ad-hoc task list
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScheduleCustomMissionRequest {
    #[validate(length(min = 1, message = "Mission name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub comment: Option<String>,
    #[validate(length(min = 1, message = "Robot id is required"))]
    pub robot_id: String,
    #[validate(length(min = 1, message = "Installation code is required"))]
    pub installation_code: String,
    pub inspection_area_id: Option<String>,
    pub inspection_frequency: Option<Duration>,
    pub desired_start_time: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "At least one task is required"))]
    pub tasks: Vec<MissionTask>,
}

/// Schedule a mission planned in Echo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEchoMissionRequest {
    pub echo_mission_id: i64,
    pub robot_id: String,
    pub installation_code: String,
    pub inspection_frequency: Option<Duration>,
    pub desired_start_time: Option<DateTime<Utc>>,
}

/// Everything a new run needs besides the robot
struct RunPlan {
    name: String,
    description: Option<String>,
    comment: Option<String>,
    installation_code: String,
    inspection_area_id: Option<String>,
    mission_id: Option<String>,
    desired_start_time: Option<DateTime<Utc>>,
    tasks: Vec<MissionTask>,
}

/// Admission checks and construction of new runs
pub struct SchedulingService {
    robots: Arc<RobotService>,
    robot_models: Arc<RobotModelService>,
    runs: Arc<MissionRunService>,
    definitions: Arc<MissionDefinitionService>,
    sources: Arc<SourceService>,
    mission_source: Arc<dyn MissionSource>,
    echo: Arc<dyn EchoMissionProvider>,
    tag_areas: Arc<dyn TagAreaResolver>,
    map_selector: Arc<dyn MapSelector>,
    service_name: String,
}

impl SchedulingService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        robots: Arc<RobotService>,
        robot_models: Arc<RobotModelService>,
        runs: Arc<MissionRunService>,
        definitions: Arc<MissionDefinitionService>,
        sources: Arc<SourceService>,
        mission_source: Arc<dyn MissionSource>,
        echo: Arc<dyn EchoMissionProvider>,
        tag_areas: Arc<dyn TagAreaResolver>,
        map_selector: Arc<dyn MapSelector>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            robots,
            robot_models,
            runs,
            definitions,
            sources,
            mission_source,
            echo,
            tag_areas,
            map_selector,
            service_name: service_name.into(),
        }
    }

    /// Schedule a new run of an existing definition
    pub async fn schedule_mission_definition(
        &self,
        definition_id: &str,
        robot_id: &str,
        desired_start_time: Option<DateTime<Utc>>,
    ) -> MissionResult<MissionRun> {
        let (robot, model) = self.check_robot_readiness(robot_id).await?;
        let definition = self.definitions.find_by_id(definition_id).await?;
        self.guard(robot_id, check_installation(&robot, &definition.installation_code))?;

        let tasks = self
            .mission_source
            .get_tasks_from_source(&definition.source, &definition.installation_code)
            .await?
            .unwrap_or_default();
        if tasks.is_empty() {
            return self.reject(
                robot_id,
                AdmissionRejection::NoTasksAvailable(format!("source of definition {} has no tasks", definition.id)),
            );
        }

        let plan = RunPlan {
            name: definition.name.clone(),
            description: None,
            comment: definition.comment.clone(),
            installation_code: definition.installation_code.clone(),
            inspection_area_id: definition.inspection_area_id.clone(),
            mission_id: Some(definition.id.clone()),
            desired_start_time,
            tasks: tasks.iter().map(MissionTask::from_template).collect(),
        };
        self.build_run(&robot, &model, plan).await
    }

    /// Schedule an Echo mission, creating its definition on first use
    pub async fn schedule_echo_mission(&self, request: ScheduleEchoMissionRequest) -> MissionResult<MissionRun> {
        let (robot, model) = self.check_robot_readiness(&request.robot_id).await?;

        let echo_mission = self
            .echo
            .get_mission(request.echo_mission_id, &request.installation_code)
            .await?
            .ok_or_else(|| MissionError::not_found("echo_mission", request.echo_mission_id.to_string()))?;

        let tasks = echo_mission.to_tasks();
        if tasks.is_empty() {
            return self.reject(
                &request.robot_id,
                AdmissionRejection::NoTasksAvailable(format!("Echo mission {} has no tags", echo_mission.id)),
            );
        }

        let inspection_area_id = self.resolve_single_deck(&request.robot_id, &tasks, &request.installation_code).await?;

        let resolved = self.sources.resolve_echo_source(request.echo_mission_id).await?;
        let definition = self
            .definitions
            .find_or_create(
                resolved,
                DefinitionTemplate {
                    name: echo_mission.name.clone(),
                    comment: None,
                    installation_code: request.installation_code.clone(),
                    inspection_area_id: inspection_area_id.clone(),
                    inspection_frequency: request.inspection_frequency,
                },
            )
            .await?;

        let plan = RunPlan {
            name: echo_mission.name,
            description: None,
            comment: None,
            installation_code: request.installation_code,
            inspection_area_id,
            mission_id: Some(definition.id),
            desired_start_time: request.desired_start_time,
            tasks,
        };
        self.build_run(&robot, &model, plan).await
    }

    /// Schedule an ad-hoc task list, deduplicated by content
    pub async fn schedule_custom_mission(&self, request: ScheduleCustomMissionRequest) -> MissionResult<MissionRun> {
        if let Err(errors) = request.validate() {
            return self.reject(&request.robot_id, AdmissionRejection::InvalidRequest(errors.to_string()));
        }

        let (robot, model) = self.check_robot_readiness(&request.robot_id).await?;
        self.guard(&request.robot_id, check_installation(&robot, &request.installation_code))?;

        let resolved = self.sources.resolve_custom_source(&request.tasks).await?;
        let definition = self
            .definitions
            .find_or_create(
                resolved,
                DefinitionTemplate {
                    name: request.name.clone(),
                    comment: request.comment.clone(),
                    installation_code: request.installation_code.clone(),
                    inspection_area_id: request.inspection_area_id.clone(),
                    inspection_frequency: request.inspection_frequency,
                },
            )
            .await?;

        let plan = RunPlan {
            name: request.name,
            description: request.description,
            comment: request.comment,
            installation_code: request.installation_code,
            inspection_area_id: request.inspection_area_id,
            mission_id: Some(definition.id),
            desired_start_time: request.desired_start_time,
            tasks: request.tasks.iter().map(MissionTask::from_template).collect(),
        };
        self.build_run(&robot, &model, plan).await
    }

    /// New run of the unfinished tasks of a past run, on the same robot
    pub async fn rerun_mission_run(
        &self,
        run_id: &str,
        desired_start_time: Option<DateTime<Utc>>,
    ) -> MissionResult<MissionRun> {
        let previous = self.runs.get(run_id).await?;
        let (robot, model) = self.check_robot_readiness(&previous.robot_id).await?;

        let tasks: Vec<MissionTask> = previous.incomplete_tasks().map(clone_task_for_rerun).collect();
        if tasks.is_empty() {
            return self.reject(
                &previous.robot_id,
                AdmissionRejection::NoTasksAvailable(format!("every task of run {} is complete", previous.id)),
            );
        }

        let plan = RunPlan {
            name: previous.name.clone(),
            description: previous.description.clone(),
            comment: previous.comment.clone(),
            installation_code: previous.installation_code.clone(),
            inspection_area_id: previous.inspection_area_id.clone(),
            mission_id: previous.mission_id.clone(),
            desired_start_time,
            tasks,
        };
        self.build_run(&robot, &model, plan).await
    }

    /// Checks 1-3: robot exists, pressure in range, battery above start threshold
    pub async fn check_robot_readiness(&self, robot_id: &str) -> MissionResult<(Robot, RobotModel)> {
        let robot = self.robots.get(robot_id).await?;
        let model = self.robot_models.get_for_type(robot.robot_type).await?;

        match model.check_pressure(robot.pressure_level) {
            PressureCheck::WithinRange => {
                log_admission_check!("pressure", robot_id, pass);
            }
            PressureCheck::TooLow => {
                return self.reject(robot_id, AdmissionRejection::PressureTooLow { level: robot.pressure_level })
            }
            PressureCheck::TooHigh => {
                return self.reject(robot_id, AdmissionRejection::PressureTooHigh { level: robot.pressure_level })
            }
        }

        if let Some(threshold) = model.battery_mission_start_threshold {
            if !model.battery_allows_mission_start(robot.battery_level) {
                return self.reject(
                    robot_id,
                    AdmissionRejection::BatteryTooLow {
                        level: robot.battery_level,
                        threshold,
                    },
                );
            }
        }
        log_admission_check!("battery", robot_id, pass);

        Ok((robot, model))
    }

    /// Area of every tagged task; more than one deck is rejected
    async fn resolve_single_deck(
        &self,
        robot_id: &str,
        tasks: &[MissionTask],
        installation_code: &str,
    ) -> MissionResult<Option<String>> {
        let tag_ids: BTreeSet<&str> = tasks.iter().filter_map(|task| task.tag_id.as_deref()).collect();

        let mut decks = BTreeSet::new();
        for tag_id in tag_ids {
            match self.tag_areas.area_for_tag(tag_id, installation_code).await? {
                Some(area) => {
                    decks.insert(area.inspection_area_id);
                }
                None => warn!("No area known for tag {} at {}", tag_id, installation_code),
            }
        }

        if decks.len() > 1 {
            return self.reject(
                robot_id,
                AdmissionRejection::MissionSpansMultipleDecks(decks.into_iter().collect()),
            );
        }
        Ok(decks.into_iter().next())
    }

    async fn build_run(&self, robot: &Robot, model: &RobotModel, plan: RunPlan) -> MissionResult<MissionRun> {
        let mut run = MissionRun::new(plan.name, robot.id.clone(), plan.installation_code, plan.tasks)
            .with_desired_start_time(plan.desired_start_time)
            .with_inspection_area(plan.inspection_area_id);
        run.description = plan.description;
        run.comment = plan.comment;
        run.mission_id = plan.mission_id;

        run.map_metadata = self
            .map_selector
            .choose_map_from_positions(&run.task_positions(), &run.installation_code)
            .await;
        if run.map_metadata.is_none() {
            warn!("🗺️  No map found for run {} at {}", run.name, run.installation_code);
        }

        if !run.tasks().is_empty() {
            run.estimated_duration = Some(estimate_duration(run.tasks(), model));
        }

        let run = self.runs.create(&run).await?;
        info!("✅ Scheduled run {} on robot {} ({} tasks)", run.id, robot.name, run.tasks().len());
        log_mission_run_scheduled(
            &self.service_name,
            &run.id,
            &robot.id,
            run.mission_id.as_deref(),
            run.tasks().len(),
        );
        Ok(run)
    }

    fn guard(&self, robot_id: &str, check: Result<(), AdmissionRejection>) -> MissionResult<()> {
        match check {
            Ok(()) => Ok(()),
            Err(rejection) => self.reject(robot_id, rejection),
        }
    }

    fn reject<T>(&self, robot_id: &str, rejection: AdmissionRejection) -> MissionResult<T> {
        log_admission_check!("admission", robot_id, fail, rejection);
        log_admission_rejected(&self.service_name, robot_id, &rejection.to_string());
        Err(rejection.into())
    }
}

/// Check 4, only for definition-based and custom scheduling
fn check_installation(robot: &Robot, mission_installation: &str) -> Result<(), AdmissionRejection> {
    if robot.current_installation_code.eq_ignore_ascii_case(mission_installation) {
        return Ok(());
    }
    Err(AdmissionRejection::RobotNotInSameInstallationAsMission {
        robot_installation: robot.current_installation_code.clone(),
        mission_installation: mission_installation.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use missionhub_models::RobotType;

    #[test]
    fn test_installation_check_ignores_case() {
        let robot = Robot::new("Nils", RobotType::AnymalX, "HUA");
        assert!(check_installation(&robot, "hua").is_ok());

        let err = check_installation(&robot, "KAA").unwrap_err();
        assert_eq!(
            err,
            AdmissionRejection::RobotNotInSameInstallationAsMission {
                robot_installation: "HUA".into(),
                mission_installation: "KAA".into(),
            }
        );
    }

    #[test]
    fn test_custom_request_validation() {
        let request = ScheduleCustomMissionRequest {
            name: String::new(),
            description: None,
            comment: None,
            robot_id: "r1".into(),
            installation_code: "HUA".into(),
            inspection_area_id: None,
            inspection_frequency: None,
            desired_start_time: None,
            tasks: Vec::new(),
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("tasks"));
        assert!(!fields.contains_key("robot_id"));
    }
}
