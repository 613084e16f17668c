use async_trait::async_trait;
use missionhub_models::MissionTask;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum CustomMissionStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage for uploaded ad-hoc task lists
#[async_trait]
pub trait CustomMissionStore: Send + Sync {
    /// Store the task list under its content hash and return its location
    async fn upload(&self, content_hash: &str, tasks: &[MissionTask]) -> Result<String, CustomMissionStoreError>;

    /// Task list stored at `location`, None if nothing is stored there
    async fn fetch(&self, location: &str) -> Result<Option<Vec<MissionTask>>, CustomMissionStoreError>;
}

/// One JSON document per content hash inside a directory
pub struct FileCustomMissionStore {
    root: PathBuf,
}

impl FileCustomMissionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, content_hash: &str) -> PathBuf {
        self.root.join(format!("{}.json", content_hash))
    }
}

#[async_trait]
impl CustomMissionStore for FileCustomMissionStore {
    async fn upload(&self, content_hash: &str, tasks: &[MissionTask]) -> Result<String, CustomMissionStoreError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.path_for(content_hash);
        let body = serde_json::to_vec_pretty(tasks)?;
        tokio::fs::write(&path, body).await?;

        info!("📦 Stored custom mission {} ({} tasks)", content_hash, tasks.len());
        Ok(path.to_string_lossy().into_owned())
    }

    async fn fetch(&self, location: &str) -> Result<Option<Vec<MissionTask>>, CustomMissionStoreError> {
        match tokio::fs::read(location).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No custom mission stored at {}", location);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use missionhub_models::{Inspection, InspectionType, Pose};

    #[tokio::test]
    async fn test_upload_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCustomMissionStore::new(dir.path().join("missions"));
        let tasks = vec![
            MissionTask::inspection(1, Pose::at(1.0, 2.0, 0.0), "TAG-1", Inspection::new(InspectionType::Image)),
            MissionTask::drive_to(2, Pose::at(3.0, 4.0, 0.0)),
        ];

        let location = store.upload("ABC123", &tasks).await.unwrap();
        assert!(location.ends_with("ABC123.json"));

        let fetched = store.fetch(&location).await.unwrap().unwrap();
        assert_eq!(fetched, tasks);
    }

    #[tokio::test]
    async fn test_fetch_missing_location() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCustomMissionStore::new(dir.path());
        let missing = dir.path().join("nope.json");

        assert!(store.fetch(&missing.to_string_lossy()).await.unwrap().is_none());
    }
}
