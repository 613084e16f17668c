pub mod custom_mission_store;
pub mod map_selector;
pub mod mission_source;
pub mod robot_control;
pub mod tag_area;

pub use custom_mission_store::{CustomMissionStore, CustomMissionStoreError, FileCustomMissionStore};
pub use map_selector::{BoundaryMapSelector, MapSelector};
pub use mission_source::{
    CompositeMissionSource, EchoMission, EchoMissionProvider, EchoTag, MissionSource, MissionSourceError,
};
pub use robot_control::{RobotControlClient, RobotControlError};
pub use tag_area::TagAreaResolver;
