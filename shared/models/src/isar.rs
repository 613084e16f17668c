//! Vocabulary reported by the robot-control service (ISAR).

use serde::{Deserialize, Serialize};

use crate::mission_run::MissionStatus;
use crate::mission_task::TaskStatus;

/// Mission as accepted by ISAR, tasks listed in execution order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IsarMission {
    pub isar_mission_id: String,
    pub tasks: Vec<IsarTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IsarTask {
    pub isar_task_id: String,
    pub isar_inspection_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IsarTaskStatus {
    NotStarted,
    InProgress,
    Paused,
    Successful,
    PartiallySuccessful,
    Failed,
    Cancelled,
}

impl From<IsarTaskStatus> for TaskStatus {
    fn from(status: IsarTaskStatus) -> Self {
        match status {
            IsarTaskStatus::NotStarted => TaskStatus::NotStarted,
            IsarTaskStatus::InProgress => TaskStatus::InProgress,
            IsarTaskStatus::Paused => TaskStatus::Paused,
            IsarTaskStatus::Successful => TaskStatus::Successful,
            IsarTaskStatus::PartiallySuccessful => TaskStatus::PartiallySuccessful,
            IsarTaskStatus::Failed => TaskStatus::Failed,
            IsarTaskStatus::Cancelled => TaskStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IsarMissionStatus {
    NotStarted,
    InProgress,
    Paused,
    Successful,
    PartiallySuccessful,
    Failed,
    Cancelled,
}

impl From<IsarMissionStatus> for MissionStatus {
    fn from(status: IsarMissionStatus) -> Self {
        match status {
            IsarMissionStatus::NotStarted => MissionStatus::Pending,
            IsarMissionStatus::InProgress => MissionStatus::Ongoing,
            IsarMissionStatus::Paused => MissionStatus::Paused,
            IsarMissionStatus::Successful => MissionStatus::Successful,
            IsarMissionStatus::PartiallySuccessful => MissionStatus::PartiallySuccessful,
            IsarMissionStatus::Failed => MissionStatus::Failed,
            IsarMissionStatus::Cancelled => MissionStatus::Cancelled,
        }
    }
}
