pub mod dispatch_service;
pub mod duration_estimator;
pub mod emergency_service;
pub mod mission_definition_service;
pub mod mission_run_service;
pub mod robot_model_service;
pub mod robot_service;
pub mod scheduling_service;
pub mod source_service;

pub use dispatch_service::DispatchService;
pub use duration_estimator::estimate_duration;
pub use emergency_service::{EmergencyOutcome, EmergencyService};
pub use mission_definition_service::MissionDefinitionService;
pub use mission_run_service::MissionRunService;
pub use robot_model_service::RobotModelService;
pub use robot_service::RobotService;
pub use scheduling_service::{ScheduleCustomMissionRequest, ScheduleEchoMissionRequest, SchedulingService};
pub use source_service::{calculate_hash_from_tasks, ResolvedSource, SourceService};
