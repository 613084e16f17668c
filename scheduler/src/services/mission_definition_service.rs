use dashmap::DashMap;
use missionhub_database::MissionDefinitionRepository;
use missionhub_models::{DefinitionTemplate, MissionDefinition};
use missionhub_observability::log_definition_created;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::source_service::{ResolvedSource, SourceService};
use crate::errors::{MissionError, MissionResult};

/// Registry of reusable mission templates, one per source
pub struct MissionDefinitionService {
    definitions: Arc<dyn MissionDefinitionRepository>,
    sources: Arc<SourceService>,
    source_locks: DashMap<String, Arc<Mutex<()>>>,
    service_name: String,
}

impl MissionDefinitionService {
    pub fn new(
        definitions: Arc<dyn MissionDefinitionRepository>,
        sources: Arc<SourceService>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            definitions,
            sources,
            source_locks: DashMap::new(),
            service_name: service_name.into(),
        }
    }

    /// Oldest live definition for the source, or a new one built from `template`.
    ///
    /// Calls for the same source key are serialised within this process.
    pub async fn find_or_create(
        &self,
        resolved: ResolvedSource,
        template: DefinitionTemplate,
    ) -> MissionResult<MissionDefinition> {
        let key = resolved.source.dedup_key();
        let lock = self.source_locks.entry(key.clone()).or_default().clone();

        let result = {
            let _guard = lock.lock().await;
            self.find_or_create_locked(resolved, template).await
        };

        drop(lock);
        // Only the map holds the lock now unless another call is waiting on it
        self.source_locks.remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    async fn find_or_create_locked(
        &self,
        resolved: ResolvedSource,
        template: DefinitionTemplate,
    ) -> MissionResult<MissionDefinition> {
        let source = if resolved.is_new {
            match self.sources.find_existing(&resolved.source).await? {
                Some(stored) => stored,
                None => self.sources.persist(&resolved.source).await?,
            }
        } else {
            resolved.source
        };

        if let Some(existing) = self
            .definitions
            .find_by_source(&source.id, false)
            .await?
            .into_iter()
            .next()
        {
            debug!("Reusing mission definition {} for source {}", existing.id, source.id);
            return Ok(existing);
        }

        let definition = self
            .definitions
            .create(&MissionDefinition::new(template, source))
            .await?;
        info!("📋 Created mission definition {} ({})", definition.id, definition.name);
        log_definition_created(
            &self.service_name,
            &definition.id,
            &definition.source.source_id,
            &definition.source.source_type.to_string(),
        );
        Ok(definition)
    }

    /// Source keys with a live `find_or_create` call
    pub fn pending_source_locks(&self) -> usize {
        self.source_locks.len()
    }

    pub async fn find_by_id(&self, definition_id: &str) -> MissionResult<MissionDefinition> {
        self.definitions
            .find_by_id(definition_id)
            .await?
            .ok_or_else(|| MissionError::not_found("mission_definition", definition_id))
    }

    pub async fn list_for_installation(
        &self,
        installation_code: &str,
        include_deprecated: bool,
    ) -> MissionResult<Vec<MissionDefinition>> {
        Ok(self
            .definitions
            .find_by_installation(installation_code, include_deprecated)
            .await?)
    }

    /// Flag flip only; existing runs are untouched
    pub async fn update_deprecation(&self, definition_id: &str, is_deprecated: bool) -> MissionResult<MissionDefinition> {
        let mut definition = self.find_by_id(definition_id).await?;
        definition.is_deprecated = is_deprecated;
        let definition = self.definitions.update(&definition).await?;
        info!("Mission definition {} deprecated={}", definition_id, is_deprecated);
        Ok(definition)
    }

    pub async fn delete(&self, definition_id: &str) -> MissionResult<()> {
        if !self.definitions.delete(definition_id).await? {
            return Err(MissionError::not_found("mission_definition", definition_id));
        }
        info!("🗑️  Deleted mission definition {}", definition_id);
        Ok(())
    }

    pub async fn record_successful_run(&self, definition_id: &str, run_id: &str) -> MissionResult<MissionDefinition> {
        let mut definition = self.find_by_id(definition_id).await?;
        definition.last_successful_run_id = Some(run_id.to_string());
        Ok(self.definitions.update(&definition).await?)
    }
}
