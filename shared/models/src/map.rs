use serde::{Deserialize, Serialize};

use crate::geometry::Position;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Boundary {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub z1: f64,
    pub z2: f64,
}

impl Boundary {
    pub fn contains(&self, position: &Position) -> bool {
        position.x >= self.x1.min(self.x2)
            && position.x <= self.x1.max(self.x2)
            && position.y >= self.y1.min(self.y2)
            && position.y <= self.y1.max(self.y2)
            && position.z >= self.z1.min(self.z2)
            && position.z <= self.z1.max(self.z2)
    }
}

/// Snapshot of the map a run was planned against
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapMetadata {
    pub map_name: String,
    pub boundary: Boundary,
}
