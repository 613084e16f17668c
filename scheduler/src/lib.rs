//! Mission-run lifecycle and scheduling engine.
//!
//! [`MissionHub`] wires the services over a [`RepositoryManager`] and the
//! external collaborators (robot control, Echo, tag areas, maps, custom
//! mission storage, event consumers).

pub mod clients;
pub mod errors;
pub mod events;
pub mod services;

pub use errors::{AdmissionRejection, ErrorKind, MissionError, MissionResult};
pub use events::{BroadcastEventBus, EventPublisher, MissionEvent};

use missionhub_config::AppConfig;
use missionhub_database::RepositoryManager;
use missionhub_observability::{init_tracing, LogFormat, TracingConfig};
use std::sync::Arc;

use clients::{
    CompositeMissionSource, CustomMissionStore, EchoMissionProvider, FileCustomMissionStore, MapSelector,
    MissionSource, RobotControlClient, TagAreaResolver,
};
use services::{
    DispatchService, EmergencyService, MissionDefinitionService, MissionRunService, RobotModelService, RobotService,
    SchedulingService, SourceService,
};

/// External systems the engine talks to
#[derive(Clone)]
pub struct Collaborators {
    pub robot_control: Arc<dyn RobotControlClient>,
    pub echo: Arc<dyn EchoMissionProvider>,
    pub tag_areas: Arc<dyn TagAreaResolver>,
    pub map_selector: Arc<dyn MapSelector>,
    pub custom_store: Arc<dyn CustomMissionStore>,
    pub events: Arc<dyn EventPublisher>,
}

/// Fully wired engine
#[derive(Clone)]
pub struct MissionHub {
    pub repositories: RepositoryManager,
    pub robots: Arc<RobotService>,
    pub robot_models: Arc<RobotModelService>,
    pub mission_runs: Arc<MissionRunService>,
    pub sources: Arc<SourceService>,
    pub definitions: Arc<MissionDefinitionService>,
    pub scheduling: Arc<SchedulingService>,
    pub dispatch: Arc<DispatchService>,
    pub emergency: Arc<EmergencyService>,
}

impl MissionHub {
    pub fn new(config: &AppConfig, repositories: RepositoryManager, collaborators: Collaborators) -> Self {
        let service_name = config.service_name.as_str();

        let robots = Arc::new(RobotService::new(
            repositories.robots(),
            config.robot_update_retries,
            service_name,
        ));
        let robot_models = Arc::new(RobotModelService::new(
            repositories.robot_models(),
            repositories.robots(),
            repositories.mission_runs(),
            config.average_duration_window_days,
        ));
        let mission_runs = Arc::new(MissionRunService::new(repositories.mission_runs(), service_name));
        let sources = Arc::new(SourceService::new(
            repositories.sources(),
            collaborators.custom_store.clone(),
        ));
        let definitions = Arc::new(MissionDefinitionService::new(
            repositories.mission_definitions(),
            sources.clone(),
            service_name,
        ));

        let mission_source: Arc<dyn MissionSource> = Arc::new(CompositeMissionSource::new(
            collaborators.echo.clone(),
            collaborators.custom_store.clone(),
        ));

        let scheduling = Arc::new(SchedulingService::new(
            robots.clone(),
            robot_models.clone(),
            mission_runs.clone(),
            definitions.clone(),
            sources.clone(),
            mission_source,
            collaborators.echo.clone(),
            collaborators.tag_areas.clone(),
            collaborators.map_selector.clone(),
            service_name,
        ));
        let dispatch = Arc::new(DispatchService::new(
            robots.clone(),
            mission_runs.clone(),
            definitions.clone(),
            robot_models.clone(),
            collaborators.robot_control.clone(),
            service_name,
        ));
        let emergency = Arc::new(EmergencyService::new(
            robots.clone(),
            mission_runs.clone(),
            repositories.areas(),
            dispatch.clone(),
            collaborators.events.clone(),
            service_name,
        ));

        Self {
            repositories,
            robots,
            robot_models,
            mission_runs,
            sources,
            definitions,
            scheduling,
            dispatch,
            emergency,
        }
    }
}

/// File store rooted at the configured directory
pub fn custom_mission_store_from_config(config: &AppConfig) -> Arc<dyn CustomMissionStore> {
    Arc::new(FileCustomMissionStore::new(config.custom_mission_store_dir.clone()))
}

/// Initialize tracing from the loaded configuration
pub fn init_observability(config: &AppConfig) -> bool {
    init_tracing(
        TracingConfig::for_service(config.service_name.clone())
            .with_level(config.log_level.clone())
            .with_format(LogFormat::parse(&config.log_format)),
    )
}

/// Load configuration from the environment and set up logging
pub fn bootstrap() -> anyhow::Result<AppConfig> {
    let config = AppConfig::from_env()?;
    if init_observability(&config) {
        tracing::info!("🚀 {} configured (store: {})", config.service_name, config.custom_mission_store_dir.display());
    }
    Ok(config)
}
