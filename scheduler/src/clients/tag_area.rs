use async_trait::async_trait;
use missionhub_models::Area;

use super::mission_source::MissionSourceError;

/// Resolves which area a tag belongs to (STID lookup)
#[async_trait]
pub trait TagAreaResolver: Send + Sync {
    async fn area_for_tag(&self, tag_id: &str, installation_code: &str) -> Result<Option<Area>, MissionSourceError>;
}
