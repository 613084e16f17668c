#![allow(dead_code)]

use async_trait::async_trait;
use missionhub_config::AppConfig;
use missionhub_database::{Repository, RepositoryManager, RobotModelRepository};
use missionhub_models::{
    Area, Inspection, InspectionType, IsarMission, IsarTask, MissionRun, MissionTask, Pose, Robot, RobotModel,
    RobotType, SafePosition,
};
use missionhub_scheduler::clients::{
    BoundaryMapSelector, EchoMission, EchoMissionProvider, FileCustomMissionStore, MissionSourceError,
    RobotControlClient, RobotControlError, TagAreaResolver,
};
use missionhub_scheduler::{Collaborators, EventPublisher, MissionEvent, MissionHub};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlBehavior {
    Accept,
    Unreachable,
    Reject(u16),
}

impl ControlBehavior {
    fn outcome(self) -> Result<(), RobotControlError> {
        match self {
            ControlBehavior::Accept => Ok(()),
            ControlBehavior::Unreachable => Err(RobotControlError::Unreachable("connection refused".into())),
            ControlBehavior::Reject(status_code) => Err(RobotControlError::Rejected {
                status_code,
                message: "rejected by robot".into(),
            }),
        }
    }
}

/// Robot-control double that records calls
pub struct FakeRobotControl {
    pub start: Mutex<ControlBehavior>,
    pub stop: Mutex<ControlBehavior>,
    pub pause: Mutex<ControlBehavior>,
    pub resume: Mutex<ControlBehavior>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeRobotControl {
    pub fn new() -> Self {
        Self {
            start: Mutex::new(ControlBehavior::Accept),
            stop: Mutex::new(ControlBehavior::Accept),
            pause: Mutex::new(ControlBehavior::Accept),
            resume: Mutex::new(ControlBehavior::Accept),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_start(&self, behavior: ControlBehavior) {
        *self.start.lock().unwrap() = behavior;
    }

    pub fn set_stop(&self, behavior: ControlBehavior) {
        *self.stop.lock().unwrap() = behavior;
    }

    pub fn set_pause(&self, behavior: ControlBehavior) {
        *self.pause.lock().unwrap() = behavior;
    }

    pub fn set_resume(&self, behavior: ControlBehavior) {
        *self.resume.lock().unwrap() = behavior;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str, robot: &Robot) {
        self.calls.lock().unwrap().push(format!("{}:{}", call, robot.id));
    }

    fn isar_mission(task_count: usize) -> IsarMission {
        let mission_id = uuid::Uuid::new_v4().to_string();
        IsarMission {
            tasks: (0..task_count)
                .map(|i| IsarTask {
                    isar_task_id: format!("{}-task-{}", mission_id, i),
                    isar_inspection_id: Some(format!("{}-inspection-{}", mission_id, i)),
                })
                .collect(),
            isar_mission_id: mission_id,
        }
    }
}

#[async_trait]
impl RobotControlClient for FakeRobotControl {
    async fn start_mission(&self, robot: &Robot, run: &MissionRun) -> Result<IsarMission, RobotControlError> {
        self.record("start_mission", robot);
        let behavior = *self.start.lock().unwrap();
        behavior.outcome()?;
        Ok(Self::isar_mission(run.tasks().len()))
    }

    async fn stop_mission(&self, robot: &Robot) -> Result<(), RobotControlError> {
        self.record("stop_mission", robot);
        let behavior = *self.stop.lock().unwrap();
        behavior.outcome()
    }

    async fn pause_mission(&self, robot: &Robot) -> Result<(), RobotControlError> {
        self.record("pause_mission", robot);
        let behavior = *self.pause.lock().unwrap();
        behavior.outcome()
    }

    async fn resume_mission(&self, robot: &Robot) -> Result<(), RobotControlError> {
        self.record("resume_mission", robot);
        let behavior = *self.resume.lock().unwrap();
        behavior.outcome()
    }

    async fn start_localization_mission(&self, robot: &Robot, _pose: &Pose) -> Result<IsarMission, RobotControlError> {
        self.record("start_localization_mission", robot);
        let behavior = *self.start.lock().unwrap();
        behavior.outcome()?;
        Ok(Self::isar_mission(1))
    }
}

#[derive(Default)]
pub struct FakeEcho {
    pub missions: Mutex<HashMap<i64, EchoMission>>,
}

#[async_trait]
impl EchoMissionProvider for FakeEcho {
    async fn get_mission(
        &self,
        echo_mission_id: i64,
        _installation_code: &str,
    ) -> Result<Option<EchoMission>, MissionSourceError> {
        Ok(self.missions.lock().unwrap().get(&echo_mission_id).cloned())
    }
}

#[derive(Default)]
pub struct FakeTagAreas {
    pub areas: Mutex<HashMap<String, Area>>,
}

#[async_trait]
impl TagAreaResolver for FakeTagAreas {
    async fn area_for_tag(&self, tag_id: &str, _installation_code: &str) -> Result<Option<Area>, MissionSourceError> {
        Ok(self.areas.lock().unwrap().get(tag_id).cloned())
    }
}

#[derive(Default)]
pub struct RecordingEvents {
    pub events: Mutex<Vec<MissionEvent>>,
}

impl EventPublisher for RecordingEvents {
    fn publish(&self, event: MissionEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct TestHub {
    pub hub: MissionHub,
    pub robot_control: Arc<FakeRobotControl>,
    pub echo: Arc<FakeEcho>,
    pub tag_areas: Arc<FakeTagAreas>,
    pub events: Arc<RecordingEvents>,
    _store_dir: tempfile::TempDir,
}

impl TestHub {
    pub fn new() -> Self {
        let store_dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            custom_mission_store_dir: store_dir.path().to_path_buf(),
            ..AppConfig::default()
        };

        let robot_control = Arc::new(FakeRobotControl::new());
        let echo = Arc::new(FakeEcho::default());
        let tag_areas = Arc::new(FakeTagAreas::default());
        let events = Arc::new(RecordingEvents::default());

        let collaborators = Collaborators {
            robot_control: robot_control.clone(),
            echo: echo.clone(),
            tag_areas: tag_areas.clone(),
            map_selector: Arc::new(BoundaryMapSelector::new()),
            custom_store: Arc::new(FileCustomMissionStore::new(store_dir.path())),
            events: events.clone(),
        };

        Self {
            hub: MissionHub::new(&config, RepositoryManager::in_memory(), collaborators),
            robot_control,
            echo,
            tag_areas,
            events,
            _store_dir: store_dir,
        }
    }

    pub async fn add_model(&self, model: RobotModel) -> RobotModel {
        self.hub.repositories.robot_models.create(&model).await.unwrap()
    }

    /// Robot at HUA with healthy readings and a model without thresholds
    pub async fn add_robot(&self) -> Robot {
        if self
            .hub
            .repositories
            .robot_models
            .find_by_type(RobotType::AnymalX)
            .await
            .unwrap()
            .is_none()
        {
            self.add_model(RobotModel::new(RobotType::AnymalX)).await;
        }
        let mut robot = Robot::new("Nils", RobotType::AnymalX, "HUA");
        robot.battery_level = Some(90.0);
        robot.pressure_level = Some(0.5);
        robot.pose = Some(Pose::at(0.0, 0.0, 0.0));
        robot.current_area_id = Some("area-1".into());
        self.hub.repositories.robots.create(&robot).await.unwrap()
    }

    pub async fn robot(&self, robot_id: &str) -> Robot {
        self.hub.robots.get(robot_id).await.unwrap()
    }

    pub async fn add_area(&self, safe_positions: Vec<SafePosition>) -> Area {
        let area = Area {
            id: "area-1".into(),
            name: "Weather deck".into(),
            installation_code: "HUA".into(),
            inspection_area_id: "deck-1".into(),
            safe_positions,
        };
        self.hub.repositories.areas.create(&area).await.unwrap()
    }

    pub async fn run_count(&self) -> usize {
        self.hub
            .repositories
            .mission_runs
            .list(&missionhub_database::Pagination::all())
            .await
            .unwrap()
            .total
    }
}

pub fn inspection_task(order: u32, x: f64, y: f64, tag: &str) -> MissionTask {
    MissionTask::inspection(order, Pose::at(x, y, 0.0), tag, Inspection::new(InspectionType::Image))
}

pub fn area(id: &str, deck: &str) -> Area {
    Area {
        id: id.into(),
        name: id.into(),
        installation_code: "HUA".into(),
        inspection_area_id: deck.into(),
        safe_positions: Vec::new(),
    }
}
