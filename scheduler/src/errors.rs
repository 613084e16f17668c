use missionhub_database::DatabaseError;
use missionhub_models::TransitionError;
use thiserror::Error;

use crate::clients::{CustomMissionStoreError, MissionSourceError, RobotControlError};

/// Why a scheduling request was refused before any run was created
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdmissionRejection {
    #[error("Battery level {level:?} is below the mission start threshold {threshold}")]
    BatteryTooLow { level: Option<f32>, threshold: f32 },

    #[error("Pressure level {level:?} is below the lower threshold")]
    PressureTooLow { level: Option<f32> },

    #[error("Pressure level {level:?} is above the upper threshold")]
    PressureTooHigh { level: Option<f32> },

    #[error("Robot is at installation {robot_installation} but the mission belongs to {mission_installation}")]
    RobotNotInSameInstallationAsMission {
        robot_installation: String,
        mission_installation: String,
    },

    #[error("Mission tags span multiple inspection areas: {0:?}")]
    MissionSpansMultipleDecks(Vec<String>),

    #[error("No tasks available: {0}")]
    NoTasksAvailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Mission queue of robot {robot_id} is frozen")]
    MissionQueueFrozen { robot_id: String },
}

#[derive(Error, Debug)]
pub enum MissionError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Admission rejected: {0}")]
    AdmissionRejected(#[from] AdmissionRejection),

    #[error("Mission source error: {0}")]
    MissionSource(#[from] MissionSourceError),

    #[error("Custom mission store error: {0}")]
    CustomMissionStore(#[from] CustomMissionStoreError),

    #[error("Robot control error: {0}")]
    RobotControl(#[from] RobotControlError),

    #[error("Invalid status transition: {0}")]
    Transition(#[from] TransitionError),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Coarse classification used by callers mapping errors to responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AdmissionRejected,
    Upstream,
    InvariantViolation,
    Storage,
}

impl MissionError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MissionError::NotFound { .. } => ErrorKind::NotFound,
            MissionError::Database(DatabaseError::NotFound { .. }) => ErrorKind::NotFound,
            MissionError::AdmissionRejected(_) => ErrorKind::AdmissionRejected,
            MissionError::MissionSource(_)
            | MissionError::CustomMissionStore(_)
            | MissionError::RobotControl(_) => ErrorKind::Upstream,
            MissionError::Transition(_) | MissionError::InvariantViolation(_) => ErrorKind::InvariantViolation,
            MissionError::Database(_) => ErrorKind::Storage,
        }
    }

    /// HTTP status the boundary layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            MissionError::AdmissionRejected(AdmissionRejection::RobotNotInSameInstallationAsMission { .. }) => 409,
            MissionError::AdmissionRejected(AdmissionRejection::MissionQueueFrozen { .. }) => 409,
            MissionError::AdmissionRejected(_) => 400,
            MissionError::Database(DatabaseError::VersionConflict { .. }) => 409,
            MissionError::Transition(_) => 409,
            _ => match self.kind() {
                ErrorKind::NotFound => 404,
                ErrorKind::Upstream => 502,
                _ => 500,
            },
        }
    }

    pub fn is_admission_rejection(&self) -> bool {
        matches!(self, MissionError::AdmissionRejected(_))
    }
}

pub type MissionResult<T> = Result<T, MissionError>;
