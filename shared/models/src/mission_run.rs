use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::geometry::Position;
use crate::inspection::Inspection;
use crate::isar::IsarMission;
use crate::lifecycle::{transition, Lifecycle, Timestamps, Transition, TransitionError};
use crate::map::MapMetadata;
use crate::mission_task::MissionTask;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    #[default]
    Pending,
    Ongoing,
    Paused,
    Successful,
    PartiallySuccessful,
    Failed,
    Cancelled,
    Aborted,
}

impl Lifecycle for MissionStatus {
    fn is_started(self) -> bool {
        matches!(self, MissionStatus::Ongoing)
    }

    fn is_terminal(self) -> bool {
        matches!(
            self,
            MissionStatus::Successful
                | MissionStatus::PartiallySuccessful
                | MissionStatus::Failed
                | MissionStatus::Cancelled
                | MissionStatus::Aborted
        )
    }

    fn is_final_once_terminal() -> bool {
        true
    }

    fn can_transition(from: Self, to: Self) -> bool {
        use MissionStatus::*;
        match (from, to) {
            (Pending, Ongoing) => true,
            (Pending, Failed | Cancelled | Aborted) => true,
            (Ongoing, Paused) | (Paused, Ongoing) => true,
            (Ongoing | Paused, to) => to.is_terminal(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissionRunType {
    #[default]
    Normal,
    ReturnHome,
    Emergency,
    Localization,
}

/// Queue priority, later variants win
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissionRunPriority {
    #[default]
    Normal,
    Response,
    Emergency,
}

/// One dispatched execution of a mission on a robot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionRun {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub status_reason: Option<String>,

    pub robot_id: String,
    /// Definition this run was generated from, None for synthetic runs
    pub mission_id: Option<String>,
    pub isar_mission_id: Option<String>,

    pub installation_code: String,
    pub inspection_area_id: Option<String>,

    pub mission_run_type: MissionRunType,
    pub priority: MissionRunPriority,
    pub desired_start_time: DateTime<Utc>,
    /// Estimated duration in seconds
    pub estimated_duration: Option<u64>,
    pub map_metadata: Option<MapMetadata>,

    status: MissionStatus,
    #[serde(flatten)]
    timestamps: Timestamps,
    #[serde(deserialize_with = "deserialize_ordered_tasks")]
    tasks: Vec<MissionTask>,

    pub created_at: DateTime<Utc>,
}

fn deserialize_ordered_tasks<'de, D>(deserializer: D) -> Result<Vec<MissionTask>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut tasks = Vec::<MissionTask>::deserialize(deserializer)?;
    tasks.sort_by_key(|task| task.task_order);
    Ok(tasks)
}

impl MissionRun {
    pub fn new(
        name: impl Into<String>,
        robot_id: impl Into<String>,
        installation_code: impl Into<String>,
        mut tasks: Vec<MissionTask>,
    ) -> Self {
        tasks.sort_by_key(|task| task.task_order);
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            comment: None,
            status_reason: None,
            robot_id: robot_id.into(),
            mission_id: None,
            isar_mission_id: None,
            installation_code: installation_code.into(),
            inspection_area_id: None,
            mission_run_type: MissionRunType::Normal,
            priority: MissionRunPriority::Normal,
            desired_start_time: now,
            estimated_duration: None,
            map_metadata: None,
            status: MissionStatus::Pending,
            timestamps: Timestamps::default(),
            tasks,
            created_at: now,
        }
    }

    pub fn with_mission_id(mut self, mission_id: impl Into<String>) -> Self {
        self.mission_id = Some(mission_id.into());
        self
    }

    pub fn with_run_type(mut self, run_type: MissionRunType) -> Self {
        self.mission_run_type = run_type;
        self
    }

    pub fn with_priority(mut self, priority: MissionRunPriority) -> Self {
        self.priority = priority;
        self
    }

    /// None keeps the default of "now"
    pub fn with_desired_start_time(mut self, desired_start_time: Option<DateTime<Utc>>) -> Self {
        if let Some(time) = desired_start_time {
            self.desired_start_time = time;
        }
        self
    }

    pub fn with_inspection_area(mut self, inspection_area_id: Option<String>) -> Self {
        self.inspection_area_id = inspection_area_id;
        self
    }

    pub fn status(&self) -> MissionStatus {
        self.status
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.timestamps.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.timestamps.end_time
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_emergency(&self) -> bool {
        self.mission_run_type == MissionRunType::Emergency
    }

    /// Tasks in `task_order`
    pub fn tasks(&self) -> &[MissionTask] {
        &self.tasks
    }

    pub fn add_task(&mut self, task: MissionTask) {
        let index = self
            .tasks
            .partition_point(|existing| existing.task_order <= task.task_order);
        self.tasks.insert(index, task);
    }

    pub fn incomplete_tasks(&self) -> impl Iterator<Item = &MissionTask> {
        self.tasks.iter().filter(|task| !task.is_completed())
    }

    pub fn task_by_isar_id_mut(&mut self, isar_task_id: &str) -> Option<&mut MissionTask> {
        self.tasks
            .iter_mut()
            .find(|task| task.isar_task_id.as_deref() == Some(isar_task_id))
    }

    pub fn inspection_by_isar_id_mut(&mut self, isar_inspection_id: &str) -> Option<&mut Inspection> {
        self.tasks
            .iter_mut()
            .filter_map(|task| task.inspection.as_mut())
            .find(|inspection| inspection.isar_inspection_id.as_deref() == Some(isar_inspection_id))
    }

    pub fn task_positions(&self) -> Vec<Position> {
        self.tasks.iter().map(|task| task.robot_pose.position).collect()
    }

    pub fn update_status(
        &mut self,
        status: MissionStatus,
        now: DateTime<Utc>,
    ) -> Result<Transition<MissionStatus>, TransitionError> {
        let next = transition(self.status, status, &self.timestamps, now)?;
        self.status = next.status;
        self.timestamps.apply(&next);
        Ok(next)
    }

    /// Record the ids ISAR assigned. Returns false, leaving the run untouched,
    /// when the task count does not match.
    pub fn apply_isar_mission(&mut self, isar_mission: &IsarMission) -> bool {
        if isar_mission.tasks.len() != self.tasks.len() {
            return false;
        }
        self.isar_mission_id = Some(isar_mission.isar_mission_id.clone());
        for (task, isar_task) in self.tasks.iter_mut().zip(&isar_mission.tasks) {
            task.isar_task_id = Some(isar_task.isar_task_id.clone());
            if let Some(inspection) = task.inspection.as_mut() {
                inspection.isar_inspection_id = isar_task.isar_inspection_id.clone();
            }
        }
        true
    }

    /// Wall-clock seconds between start and end, when both are known
    pub fn duration_seconds(&self) -> Option<i64> {
        match (self.timestamps.start_time, self.timestamps.end_time) {
            (Some(start), Some(end)) => Some((end - start).num_seconds()),
            _ => None,
        }
    }
}
