use async_trait::async_trait;
use missionhub_models::{Inspection, MissionTask, Pose, Source, SourceType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::custom_mission_store::{CustomMissionStore, CustomMissionStoreError};

#[derive(Error, Debug)]
pub enum MissionSourceError {
    #[error("Upstream mission provider failed: {0}")]
    Upstream(String),

    #[error("Invalid source {source_id}: {reason}")]
    InvalidSource { source_id: String, reason: String },

    #[error(transparent)]
    CustomStore(#[from] CustomMissionStoreError),
}

/// A planned inspection point in an upstream Echo mission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EchoTag {
    pub tag_id: String,
    pub tag_link: Option<String>,
    pub robot_pose: Pose,
    pub inspections: Vec<Inspection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EchoMission {
    pub id: i64,
    pub name: String,
    pub installation_code: String,
    pub tags: Vec<EchoTag>,
}

impl EchoMission {
    /// One task per inspection, numbered in tag order.
    /// A tag without inspections still becomes a drive-to step.
    pub fn to_tasks(&self) -> Vec<MissionTask> {
        let mut tasks = Vec::new();
        let mut order = 0;
        for tag in &self.tags {
            if tag.inspections.is_empty() {
                let mut task = MissionTask::drive_to(order, tag.robot_pose.clone());
                task.tag_id = Some(tag.tag_id.clone());
                task.tag_link = tag.tag_link.clone();
                tasks.push(task);
                order += 1;
                continue;
            }
            for inspection in &tag.inspections {
                let mut task =
                    MissionTask::inspection(order, tag.robot_pose.clone(), tag.tag_id.clone(), inspection.fresh_copy());
                task.tag_link = tag.tag_link.clone();
                tasks.push(task);
                order += 1;
            }
        }
        tasks
    }
}

/// Upstream planner holding Echo missions
#[async_trait]
pub trait EchoMissionProvider: Send + Sync {
    async fn get_mission(
        &self,
        echo_mission_id: i64,
        installation_code: &str,
    ) -> Result<Option<EchoMission>, MissionSourceError>;
}

/// Loads the task list behind a mission definition's source
#[async_trait]
pub trait MissionSource: Send + Sync {
    /// None means the source has no tasks to offer
    async fn get_tasks_from_source(
        &self,
        source: &Source,
        installation_code: &str,
    ) -> Result<Option<Vec<MissionTask>>, MissionSourceError>;
}

/// Routes Echo sources to the upstream provider and custom ones to the store
pub struct CompositeMissionSource {
    echo: Arc<dyn EchoMissionProvider>,
    custom: Arc<dyn CustomMissionStore>,
}

impl CompositeMissionSource {
    pub fn new(echo: Arc<dyn EchoMissionProvider>, custom: Arc<dyn CustomMissionStore>) -> Self {
        Self { echo, custom }
    }
}

#[async_trait]
impl MissionSource for CompositeMissionSource {
    async fn get_tasks_from_source(
        &self,
        source: &Source,
        installation_code: &str,
    ) -> Result<Option<Vec<MissionTask>>, MissionSourceError> {
        match source.source_type {
            SourceType::Echo => {
                let echo_id: i64 = source.source_id.parse().map_err(|_| MissionSourceError::InvalidSource {
                    source_id: source.source_id.clone(),
                    reason: "Echo source id is not numeric".to_string(),
                })?;
                debug!("Loading Echo mission {} for {}", echo_id, installation_code);
                let mission = self.echo.get_mission(echo_id, installation_code).await?;
                Ok(mission.map(|m| m.to_tasks()))
            }
            SourceType::Custom => Ok(self.custom.fetch(&source.source_id).await?),
        }
    }
}
