use missionhub_database::SourceRepository;
use missionhub_models::{InspectionType, MissionTask, MissionTaskType, Pose, Position, Source, SourceType};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info};

use crate::clients::{CustomMissionStore, CustomMissionStoreError};
use crate::errors::{AdmissionRejection, MissionResult};

/// A source looked up or built for a scheduling request.
/// New sources are not persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSource {
    pub source: Source,
    pub is_new: bool,
}

/// Semantic content of a task; generated ids, statuses and timestamps are left out
#[derive(Serialize)]
struct TaskFingerprint<'a> {
    task_order: u32,
    task_type: MissionTaskType,
    tag_id: Option<&'a str>,
    robot_pose: &'a Pose,
    inspection: Option<InspectionFingerprint<'a>>,
}

#[derive(Serialize)]
struct InspectionFingerprint<'a> {
    inspection_type: InspectionType,
    video_duration: Option<f32>,
    analysis_types: &'a [String],
    inspection_target: Option<Position>,
}

/// Uppercase hex SHA-256 over the task list's semantic content, in list order
pub fn calculate_hash_from_tasks(tasks: &[MissionTask]) -> MissionResult<String> {
    let fingerprint: Vec<TaskFingerprint<'_>> = tasks
        .iter()
        .map(|task| TaskFingerprint {
            task_order: task.task_order,
            task_type: task.task_type,
            tag_id: task.tag_id.as_deref(),
            robot_pose: &task.robot_pose,
            inspection: task.inspection.as_ref().map(|inspection| InspectionFingerprint {
                inspection_type: inspection.inspection_type,
                video_duration: inspection.video_duration,
                analysis_types: &inspection.analysis_types,
                inspection_target: inspection.inspection_target,
            }),
        })
        .collect();

    let bytes = serde_json::to_vec(&fingerprint).map_err(CustomMissionStoreError::Serialization)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode_upper(hasher.finalize()))
}

/// Maps Echo ids and custom task lists onto deduplicated sources
pub struct SourceService {
    sources: Arc<dyn SourceRepository>,
    custom_store: Arc<dyn CustomMissionStore>,
}

impl SourceService {
    pub fn new(sources: Arc<dyn SourceRepository>, custom_store: Arc<dyn CustomMissionStore>) -> Self {
        Self { sources, custom_store }
    }

    pub async fn resolve_echo_source(&self, echo_mission_id: i64) -> MissionResult<ResolvedSource> {
        let key = echo_mission_id.to_string();
        if let Some(source) = self.sources.find_by_source_id(SourceType::Echo, &key).await? {
            debug!("Reusing Echo source {} for mission {}", source.id, key);
            return Ok(ResolvedSource { source, is_new: false });
        }

        Ok(ResolvedSource {
            source: Source::echo(echo_mission_id),
            is_new: true,
        })
    }

    /// Finds the source with identical content, or uploads the tasks and
    /// returns a new source pointing at the stored copy
    pub async fn resolve_custom_source(&self, tasks: &[MissionTask]) -> MissionResult<ResolvedSource> {
        if tasks.is_empty() {
            return Err(AdmissionRejection::NoTasksAvailable("custom mission has no tasks".to_string()).into());
        }

        let hash = calculate_hash_from_tasks(tasks)?;
        if let Some(source) = self.sources.find_by_content_hash(&hash).await? {
            debug!("Reusing custom source {} for hash {}", source.id, hash);
            return Ok(ResolvedSource { source, is_new: false });
        }

        let location = self.custom_store.upload(&hash, tasks).await?;
        info!("🆕 New custom mission source {} stored at {}", hash, location);

        Ok(ResolvedSource {
            source: Source::custom(location, hash),
            is_new: true,
        })
    }

    /// Stored copy of a source with the same dedup key, if one appeared since resolution
    pub async fn find_existing(&self, source: &Source) -> MissionResult<Option<Source>> {
        let existing = match (&source.source_type, &source.content_hash) {
            (SourceType::Custom, Some(hash)) => self.sources.find_by_content_hash(hash).await?,
            _ => {
                self.sources
                    .find_by_source_id(source.source_type, &source.source_id)
                    .await?
            }
        };
        Ok(existing)
    }

    pub async fn persist(&self, source: &Source) -> MissionResult<Source> {
        Ok(self.sources.create(source).await?)
    }
}
