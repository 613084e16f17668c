use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::source::Source;

/// Reusable mission template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionDefinition {
    pub id: String,
    pub name: String,
    pub comment: Option<String>,
    pub installation_code: String,
    pub inspection_area_id: Option<String>,
    pub inspection_frequency: Option<Duration>,
    pub source: Source,
    pub is_deprecated: bool,
    pub last_successful_run_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields a caller supplies when a definition has to be created
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionTemplate {
    pub name: String,
    pub comment: Option<String>,
    pub installation_code: String,
    pub inspection_area_id: Option<String>,
    pub inspection_frequency: Option<Duration>,
}

impl MissionDefinition {
    pub fn new(template: DefinitionTemplate, source: Source) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: template.name,
            comment: template.comment,
            installation_code: template.installation_code,
            inspection_area_id: template.inspection_area_id,
            inspection_frequency: template.inspection_frequency,
            source,
            is_deprecated: false,
            last_successful_run_id: None,
            created_at: Utc::now(),
        }
    }
}
