use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Position;
use crate::lifecycle::{transition, Lifecycle, Timestamps, Transition, TransitionError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InspectionType {
    Image,
    Video,
    ThermalImage,
    ThermalVideo,
    Audio,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    #[default]
    NotStarted,
    InProgress,
    Successful,
    Failed,
    Cancelled,
}

impl Lifecycle for InspectionStatus {
    fn is_started(self) -> bool {
        matches!(self, InspectionStatus::InProgress)
    }

    fn is_terminal(self) -> bool {
        matches!(
            self,
            InspectionStatus::Successful | InspectionStatus::Failed | InspectionStatus::Cancelled
        )
    }
}

/// Inspection performed at the end of a task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Inspection {
    pub id: String,
    pub isar_inspection_id: Option<String>,
    pub inspection_type: InspectionType,
    /// Recording length in seconds, only meaningful for video and audio
    pub video_duration: Option<f32>,
    pub analysis_types: Vec<String>,
    pub inspection_target: Option<Position>,
    pub inspection_url: Option<String>,
    status: InspectionStatus,
    #[serde(flatten)]
    timestamps: Timestamps,
}

impl Inspection {
    pub fn new(inspection_type: InspectionType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            isar_inspection_id: None,
            inspection_type,
            video_duration: None,
            analysis_types: Vec::new(),
            inspection_target: None,
            inspection_url: None,
            status: InspectionStatus::NotStarted,
            timestamps: Timestamps::default(),
        }
    }

    pub fn with_video_duration(mut self, seconds: f32) -> Self {
        self.video_duration = Some(seconds);
        self
    }

    pub fn with_analysis_types(mut self, analysis_types: Vec<String>) -> Self {
        self.analysis_types = analysis_types;
        self
    }

    pub fn with_target(mut self, target: Position) -> Self {
        self.inspection_target = Some(target);
        self
    }

    pub fn status(&self) -> InspectionStatus {
        self.status
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.timestamps.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.timestamps.end_time
    }

    pub fn update_status(
        &mut self,
        status: InspectionStatus,
        now: DateTime<Utc>,
    ) -> Result<Transition<InspectionStatus>, TransitionError> {
        let next = transition(self.status, status, &self.timestamps, now)?;
        self.status = next.status;
        self.timestamps.apply(&next);
        Ok(next)
    }

    /// Same inspection definition with fresh identity and no recorded outcome
    pub fn fresh_copy(&self) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            isar_inspection_id: None,
            inspection_type: self.inspection_type,
            video_duration: self.video_duration,
            analysis_types: self.analysis_types.clone(),
            inspection_target: self.inspection_target,
            inspection_url: None,
            status: InspectionStatus::NotStarted,
            timestamps: Timestamps::default(),
        }
    }
}
