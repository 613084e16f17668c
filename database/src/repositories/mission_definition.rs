use async_trait::async_trait;
use missionhub_models::MissionDefinition;

use super::Repository;
use crate::errors::DbResult;
use crate::memory::MemoryTable;

#[async_trait]
pub trait MissionDefinitionRepository: Repository<MissionDefinition> {
    /// Definitions pointing at the given source row, oldest first
    async fn find_by_source(
        &self,
        source_row_id: &str,
        include_deprecated: bool,
    ) -> DbResult<Vec<MissionDefinition>>;

    async fn find_by_installation(
        &self,
        installation_code: &str,
        include_deprecated: bool,
    ) -> DbResult<Vec<MissionDefinition>>;
}

#[async_trait]
impl MissionDefinitionRepository for MemoryTable<MissionDefinition> {
    async fn find_by_source(
        &self,
        source_row_id: &str,
        include_deprecated: bool,
    ) -> DbResult<Vec<MissionDefinition>> {
        Ok(self.filter(|definition| {
            definition.source.id == source_row_id && (include_deprecated || !definition.is_deprecated)
        }))
    }

    async fn find_by_installation(
        &self,
        installation_code: &str,
        include_deprecated: bool,
    ) -> DbResult<Vec<MissionDefinition>> {
        Ok(self.filter(|definition| {
            definition.installation_code.eq_ignore_ascii_case(installation_code)
                && (include_deprecated || !definition.is_deprecated)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use missionhub_models::{DefinitionTemplate, Source};

    fn template(name: &str) -> DefinitionTemplate {
        DefinitionTemplate {
            name: name.to_string(),
            installation_code: "HUA".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_find_by_source_skips_deprecated() {
        let repo = MemoryTable::<MissionDefinition>::new();
        let source = Source::echo(7);

        let mut old = MissionDefinition::new(template("old"), source.clone());
        old.is_deprecated = true;
        repo.create(&old).await.unwrap();
        let current = repo
            .create(&MissionDefinition::new(template("current"), source.clone()))
            .await
            .unwrap();
        repo.create(&MissionDefinition::new(template("other"), Source::echo(8)))
            .await
            .unwrap();

        let active = repo.find_by_source(&source.id, false).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, current.id);

        let all = repo.find_by_source(&source.id, true).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, old.id);
    }

    #[tokio::test]
    async fn test_find_by_installation() {
        let repo = MemoryTable::<MissionDefinition>::new();
        repo.create(&MissionDefinition::new(template("a"), Source::echo(1)))
            .await
            .unwrap();

        assert_eq!(repo.find_by_installation("hua", false).await.unwrap().len(), 1);
        assert!(repo.find_by_installation("KAA", false).await.unwrap().is_empty());
    }
}
