use async_trait::async_trait;
use missionhub_models::{IsarMission, MissionRun, Pose, Robot};
use thiserror::Error;

/// Failures reported by the robot-control ("ISAR") client
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RobotControlError {
    #[error("Robot control unreachable: {0}")]
    Unreachable(String),

    #[error("Robot control rejected request with status {status_code}: {message}")]
    Rejected { status_code: u16, message: String },

    #[error("Malformed robot control response: {0}")]
    MalformedResponse(String),
}

impl RobotControlError {
    /// Connectivity failures take the robot offline
    pub fn is_connectivity(&self) -> bool {
        matches!(self, RobotControlError::Unreachable(_))
    }

    /// 409 from a stop request means the robot is already idle
    pub fn is_conflict(&self) -> bool {
        matches!(self, RobotControlError::Rejected { status_code: 409, .. })
    }
}

/// Client driving the robot through the robot-control protocol
#[async_trait]
pub trait RobotControlClient: Send + Sync {
    async fn start_mission(&self, robot: &Robot, run: &MissionRun) -> Result<IsarMission, RobotControlError>;

    async fn stop_mission(&self, robot: &Robot) -> Result<(), RobotControlError>;

    async fn pause_mission(&self, robot: &Robot) -> Result<(), RobotControlError>;

    async fn resume_mission(&self, robot: &Robot) -> Result<(), RobotControlError>;

    async fn start_localization_mission(&self, robot: &Robot, pose: &Pose) -> Result<IsarMission, RobotControlError>;
}
