use async_trait::async_trait;
use dashmap::DashMap;
use missionhub_models::{MapMetadata, Position};

/// Picks the map a run should be planned against
#[async_trait]
pub trait MapSelector: Send + Sync {
    /// None is a valid outcome when no map covers the positions
    async fn choose_map_from_positions(&self, positions: &[Position], installation_code: &str) -> Option<MapMetadata>;
}

/// Chooses the first registered map whose boundary holds every position
#[derive(Default)]
pub struct BoundaryMapSelector {
    maps: DashMap<String, Vec<MapMetadata>>,
}

impl BoundaryMapSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, installation_code: &str, map: MapMetadata) {
        self.maps
            .entry(installation_code.to_uppercase())
            .or_default()
            .push(map);
    }
}

#[async_trait]
impl MapSelector for BoundaryMapSelector {
    async fn choose_map_from_positions(&self, positions: &[Position], installation_code: &str) -> Option<MapMetadata> {
        if positions.is_empty() {
            return None;
        }
        let maps = self.maps.get(&installation_code.to_uppercase())?;
        maps.iter()
            .find(|map| positions.iter().all(|p| map.boundary.contains(p)))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use missionhub_models::Boundary;

    fn map(name: &str, size: f64) -> MapMetadata {
        MapMetadata {
            map_name: name.to_string(),
            boundary: Boundary {
                x1: 0.0,
                y1: 0.0,
                x2: size,
                y2: size,
                z1: -1.0,
                z2: 1.0,
            },
        }
    }

    #[tokio::test]
    async fn test_first_covering_map_wins() {
        let selector = BoundaryMapSelector::new();
        selector.register("HUA", map("small", 10.0));
        selector.register("HUA", map("large", 100.0));

        let inside_small = [Position::new(1.0, 1.0, 0.0), Position::new(9.0, 9.0, 0.0)];
        let chosen = selector.choose_map_from_positions(&inside_small, "hua").await;
        assert_eq!(chosen.map(|m| m.map_name), Some("small".to_string()));

        let spread = [Position::new(1.0, 1.0, 0.0), Position::new(50.0, 50.0, 0.0)];
        let chosen = selector.choose_map_from_positions(&spread, "HUA").await;
        assert_eq!(chosen.map(|m| m.map_name), Some("large".to_string()));
    }

    #[tokio::test]
    async fn test_no_map_is_not_an_error() {
        let selector = BoundaryMapSelector::new();
        selector.register("HUA", map("small", 10.0));

        let outside = [Position::new(500.0, 0.0, 0.0)];
        assert!(selector.choose_map_from_positions(&outside, "HUA").await.is_none());
        assert!(selector.choose_map_from_positions(&outside, "KAA").await.is_none());
    }
}
