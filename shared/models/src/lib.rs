//! Domain types for the MissionHub fleet manager.
//!
//! Missions, tasks and inspections carry their status privately; every status
//! change goes through [`lifecycle::transition`] so start and end timestamps
//! are written exactly once.

pub mod area;
pub mod geometry;
pub mod inspection;
pub mod isar;
pub mod lifecycle;
pub mod map;
pub mod mission_definition;
pub mod mission_run;
pub mod mission_task;
pub mod robot;
pub mod source;

pub use area::{Area, InspectionArea, SafePosition};
pub use geometry::{Orientation, Pose, Position};
pub use inspection::{Inspection, InspectionStatus, InspectionType};
pub use isar::{IsarMission, IsarMissionStatus, IsarTask, IsarTaskStatus};
pub use lifecycle::{transition, Lifecycle, Timestamps, Transition, TransitionError};
pub use map::{Boundary, MapMetadata};
pub use mission_definition::{DefinitionTemplate, MissionDefinition};
pub use mission_run::{MissionRun, MissionRunPriority, MissionRunType, MissionStatus};
pub use mission_task::{clone_task_for_rerun, MissionTask, MissionTaskType, TaskStatus};
pub use robot::{PressureCheck, Robot, RobotModel, RobotStatus, RobotType};
pub use source::{Source, SourceType};
