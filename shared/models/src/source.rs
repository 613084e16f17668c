use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Echo,
    Custom,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Echo => write!(f, "echo"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Deduplication key of a mission template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub id: String,
    /// Upstream mission id for Echo, storage location for Custom
    pub source_id: String,
    pub source_type: SourceType,
    /// Uppercase hex SHA-256 of the task content, Custom only
    pub content_hash: Option<String>,
}

impl Source {
    pub fn echo(echo_mission_id: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_id: echo_mission_id.to_string(),
            source_type: SourceType::Echo,
            content_hash: None,
        }
    }

    pub fn custom(location: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_id: location.into(),
            source_type: SourceType::Custom,
            content_hash: Some(content_hash.into()),
        }
    }

    /// Key identifying the template content regardless of storage location
    pub fn dedup_key(&self) -> String {
        match (&self.source_type, &self.content_hash) {
            (SourceType::Custom, Some(hash)) => format!("custom:{}", hash),
            _ => format!("{}:{}", self.source_type, self.source_id),
        }
    }
}
