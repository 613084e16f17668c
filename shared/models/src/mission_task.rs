use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Pose;
use crate::inspection::Inspection;
use crate::lifecycle::{transition, Lifecycle, Timestamps, Transition, TransitionError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissionTaskType {
    #[default]
    Inspection,
    DriveTo,
    Localization,
    ReturnHome,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Paused,
    Successful,
    PartiallySuccessful,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Tasks in these statuses are not repeated by a rerun
    pub fn is_completed(self) -> bool {
        matches!(self, TaskStatus::Successful | TaskStatus::PartiallySuccessful)
    }
}

impl Lifecycle for TaskStatus {
    fn is_started(self) -> bool {
        matches!(self, TaskStatus::InProgress)
    }

    fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Successful
                | TaskStatus::PartiallySuccessful
                | TaskStatus::Failed
                | TaskStatus::Cancelled
        )
    }
}

/// One drive-and-inspect step of a mission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionTask {
    pub id: String,
    pub isar_task_id: Option<String>,
    /// Ordering key, unique within a run but not necessarily contiguous
    pub task_order: u32,
    pub task_type: MissionTaskType,
    pub tag_id: Option<String>,
    pub tag_link: Option<String>,
    pub description: Option<String>,
    pub robot_pose: Pose,
    pub inspection: Option<Inspection>,
    status: TaskStatus,
    #[serde(flatten)]
    timestamps: Timestamps,
}

impl MissionTask {
    pub fn new(task_order: u32, task_type: MissionTaskType, robot_pose: Pose) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            isar_task_id: None,
            task_order,
            task_type,
            tag_id: None,
            tag_link: None,
            description: None,
            robot_pose,
            inspection: None,
            status: TaskStatus::NotStarted,
            timestamps: Timestamps::default(),
        }
    }

    pub fn inspection(
        task_order: u32,
        robot_pose: Pose,
        tag_id: impl Into<String>,
        inspection: Inspection,
    ) -> Self {
        let mut task = Self::new(task_order, MissionTaskType::Inspection, robot_pose);
        task.tag_id = Some(tag_id.into());
        task.inspection = Some(inspection);
        task
    }

    pub fn drive_to(task_order: u32, robot_pose: Pose) -> Self {
        Self::new(task_order, MissionTaskType::DriveTo, robot_pose)
    }

    pub fn localization(robot_pose: Pose) -> Self {
        Self::new(0, MissionTaskType::Localization, robot_pose)
    }

    /// Deep copy of a template task with fresh identity.
    ///
    /// Order, pose, tag linkage and inspection definitions are kept; ids,
    /// ISAR ids, status and timestamps start over.
    pub fn from_template(template: &MissionTask) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            isar_task_id: None,
            task_order: template.task_order,
            task_type: template.task_type,
            tag_id: template.tag_id.clone(),
            tag_link: template.tag_link.clone(),
            description: template.description.clone(),
            robot_pose: template.robot_pose.clone(),
            inspection: template.inspection.as_ref().map(Inspection::fresh_copy),
            status: TaskStatus::NotStarted,
            timestamps: Timestamps::default(),
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.timestamps.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.timestamps.end_time
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    pub fn update_status(
        &mut self,
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> Result<Transition<TaskStatus>, TransitionError> {
        let next = transition(self.status, status, &self.timestamps, now)?;
        self.status = next.status;
        self.timestamps.apply(&next);
        Ok(next)
    }
}

/// Fresh, independent copy of a task for a new run
pub fn clone_task_for_rerun(task: &MissionTask) -> MissionTask {
    MissionTask::from_template(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::InspectionType;
    use chrono::Duration;

    fn sample_task() -> MissionTask {
        MissionTask::inspection(
            3,
            Pose::at(1.0, 2.0, 0.0),
            "A-73MA001",
            Inspection::new(InspectionType::ThermalImage),
        )
    }

    #[test]
    fn test_task_timestamps_single_write() {
        let t0 = Utc::now();
        let mut task = sample_task();

        task.update_status(TaskStatus::InProgress, t0).unwrap();
        task.update_status(TaskStatus::InProgress, t0 + Duration::seconds(1)).unwrap();
        task.update_status(TaskStatus::Successful, t0 + Duration::seconds(2)).unwrap();
        task.update_status(TaskStatus::Successful, t0 + Duration::seconds(3)).unwrap();

        assert_eq!(task.start_time(), Some(t0));
        assert_eq!(task.end_time(), Some(t0 + Duration::seconds(2)));
    }

    #[test]
    fn test_status_after_completion_keeps_timestamps() {
        let t0 = Utc::now();
        let mut task = sample_task();
        task.update_status(TaskStatus::Failed, t0).unwrap();
        task.update_status(TaskStatus::Cancelled, t0 + Duration::seconds(9)).unwrap();

        assert_eq!(task.status(), TaskStatus::Cancelled);
        assert_eq!(task.start_time(), None);
        assert_eq!(task.end_time(), Some(t0));
    }

    #[test]
    fn test_clone_for_rerun_regenerates_identity() {
        let mut task = sample_task();
        task.isar_task_id = Some("isar-task".to_string());
        task.update_status(TaskStatus::InProgress, Utc::now()).unwrap();
        task.update_status(TaskStatus::Failed, Utc::now()).unwrap();

        let fresh = clone_task_for_rerun(&task);

        assert_ne!(fresh.id, task.id);
        assert_eq!(fresh.isar_task_id, None);
        assert_eq!(fresh.status(), TaskStatus::NotStarted);
        assert_eq!(fresh.start_time(), None);
        assert_eq!(fresh.end_time(), None);
        assert_eq!(fresh.task_order, 3);
        assert_eq!(fresh.tag_id.as_deref(), Some("A-73MA001"));
        assert_eq!(fresh.robot_pose, task.robot_pose);

        let inspection = fresh.inspection.as_ref().unwrap();
        assert_ne!(inspection.id, task.inspection.as_ref().unwrap().id);
        assert_eq!(inspection.inspection_type, InspectionType::ThermalImage);
    }
}
