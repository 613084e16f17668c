use chrono::{DateTime, Utc};
use missionhub_models::{MissionRun, MissionRunType, MissionStatus};
use serde::{Deserialize, Serialize};

use super::Pagination;

/// Filter for mission run lookups. Empty collections match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissionRunQuery {
    pub robot_ids: Vec<String>,
    pub mission_id: Option<String>,
    pub installation_code: Option<String>,
    pub statuses: Vec<MissionStatus>,
    pub run_types: Vec<MissionRunType>,
    pub min_desired_start_time: Option<DateTime<Utc>>,
    pub max_desired_start_time: Option<DateTime<Utc>>,
    pub pagination: Option<Pagination>,
}

impl MissionRunQuery {
    pub fn for_robot(robot_id: impl Into<String>) -> Self {
        Self {
            robot_ids: vec![robot_id.into()],
            ..Default::default()
        }
    }

    pub fn for_mission(mission_id: impl Into<String>) -> Self {
        Self {
            mission_id: Some(mission_id.into()),
            ..Default::default()
        }
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = MissionStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_run_types(mut self, run_types: impl IntoIterator<Item = MissionRunType>) -> Self {
        self.run_types = run_types.into_iter().collect();
        self
    }

    pub fn with_installation(mut self, installation_code: impl Into<String>) -> Self {
        self.installation_code = Some(installation_code.into());
        self
    }

    pub fn desired_after(mut self, time: DateTime<Utc>) -> Self {
        self.min_desired_start_time = Some(time);
        self
    }

    pub fn desired_before(mut self, time: DateTime<Utc>) -> Self {
        self.max_desired_start_time = Some(time);
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn matches(&self, run: &MissionRun) -> bool {
        if !self.robot_ids.is_empty() && !self.robot_ids.iter().any(|id| *id == run.robot_id) {
            return false;
        }
        if let Some(mission_id) = &self.mission_id {
            if run.mission_id.as_ref() != Some(mission_id) {
                return false;
            }
        }
        if let Some(installation) = &self.installation_code {
            if !run.installation_code.eq_ignore_ascii_case(installation) {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&run.status()) {
            return false;
        }
        if !self.run_types.is_empty() && !self.run_types.contains(&run.mission_run_type) {
            return false;
        }
        if self
            .min_desired_start_time
            .is_some_and(|min| run.desired_start_time < min)
        {
            return false;
        }
        if self
            .max_desired_start_time
            .is_some_and(|max| run.desired_start_time > max)
        {
            return false;
        }
        true
    }
}
