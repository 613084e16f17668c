use serde::{Deserialize, Serialize};

use crate::geometry::{Pose, Position};

/// Deck-level grouping of areas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InspectionArea {
    pub id: String,
    pub name: String,
    pub installation_code: String,
    pub plant_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafePosition {
    pub id: String,
    pub pose: Pose,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Area {
    pub id: String,
    pub name: String,
    pub installation_code: String,
    pub inspection_area_id: String,
    pub safe_positions: Vec<SafePosition>,
}

impl Area {
    /// Safe position closest to `from` by straight-line distance
    pub fn closest_safe_position(&self, from: &Position) -> Option<&SafePosition> {
        self.safe_positions.iter().min_by(|a, b| {
            let da = a.pose.position.euclidean_distance(from);
            let db = b.pose.position.euclidean_distance(from);
            da.total_cmp(&db)
        })
    }
}
