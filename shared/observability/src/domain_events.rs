//! Domain event logging for MissionHub.
//!
//! Business events (runs scheduled, robots taken offline, emergency actions)
//! are emitted as structured logs on the `domain_event` target.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a domain operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OperationResult {
    Success,
    Failure,
    Rejected,
    Skipped,
}

impl std::fmt::Display for OperationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Rejected => write!(f, "rejected"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Categories of domain events for filtering and routing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Scheduling,
    MissionRun,
    MissionDefinition,
    Robot,
    Emergency,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduling => write!(f, "scheduling"),
            Self::MissionRun => write!(f, "mission_run"),
            Self::MissionDefinition => write!(f, "mission_definition"),
            Self::Robot => write!(f, "robot"),
            Self::Emergency => write!(f, "emergency"),
        }
    }
}

/// A structured domain event for logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub timestamp: DateTime<Utc>,
    pub category: EventCategory,
    /// Specific event type, e.g. "run_scheduled", "robot_offline"
    pub event_type: String,
    /// Entity type being operated on, e.g. "mission_run", "robot"
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub robot_id: Option<String>,
    pub result: OperationResult,
    /// Reason for a failure or rejection
    pub reason: Option<String>,
    pub service: String,
    pub metadata: Option<serde_json::Value>,
}

impl DomainEvent {
    pub fn new(service: impl Into<String>, category: EventCategory, event_type: impl Into<String>) -> DomainEventBuilder {
        DomainEventBuilder {
            service: service.into(),
            category,
            event_type: event_type.into(),
            entity_type: None,
            entity_id: None,
            robot_id: None,
            result: OperationResult::Success,
            reason: None,
            metadata: None,
        }
    }
}

/// Builder for constructing domain events
pub struct DomainEventBuilder {
    service: String,
    category: EventCategory,
    event_type: String,
    entity_type: Option<String>,
    entity_id: Option<String>,
    robot_id: Option<String>,
    result: OperationResult,
    reason: Option<String>,
    metadata: Option<serde_json::Value>,
}

impl DomainEventBuilder {
    pub fn entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn robot(mut self, robot_id: impl Into<String>) -> Self {
        self.robot_id = Some(robot_id.into());
        self
    }

    pub fn success(mut self) -> Self {
        self.result = OperationResult::Success;
        self
    }

    pub fn failure(mut self, reason: impl Into<String>) -> Self {
        self.result = OperationResult::Failure;
        self.reason = Some(reason.into());
        self
    }

    pub fn rejected(mut self, reason: impl Into<String>) -> Self {
        self.result = OperationResult::Rejected;
        self.reason = Some(reason.into());
        self
    }

    pub fn skipped(mut self) -> Self {
        self.result = OperationResult::Skipped;
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Build and emit the event as a log
    pub fn emit(self) {
        let event = self.build();
        let json = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());

        match event.result {
            OperationResult::Success => tracing::info!(
                target: "domain_event",
                category = %event.category,
                event_type = %event.event_type,
                result = "success",
                "DomainEvent: {}", json
            ),
            OperationResult::Failure => tracing::error!(
                target: "domain_event",
                category = %event.category,
                event_type = %event.event_type,
                result = "failure",
                reason = ?event.reason,
                "DomainEvent: {}", json
            ),
            OperationResult::Rejected => tracing::warn!(
                target: "domain_event",
                category = %event.category,
                event_type = %event.event_type,
                result = "rejected",
                reason = ?event.reason,
                "DomainEvent: {}", json
            ),
            OperationResult::Skipped => tracing::debug!(
                target: "domain_event",
                category = %event.category,
                event_type = %event.event_type,
                result = "skipped",
                "DomainEvent: {}", json
            ),
        }
    }

    /// Build the event without emitting
    pub fn build(self) -> DomainEvent {
        DomainEvent {
            timestamp: Utc::now(),
            category: self.category,
            event_type: self.event_type,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            robot_id: self.robot_id,
            result: self.result,
            reason: self.reason,
            service: self.service,
            metadata: self.metadata,
        }
    }
}

// ============================================================================
// Convenience functions for common domain events
// ============================================================================

pub fn log_mission_run_scheduled(service: &str, run_id: &str, robot_id: &str, mission_id: Option<&str>, task_count: usize) {
    DomainEvent::new(service, EventCategory::Scheduling, "run_scheduled")
        .entity("mission_run", run_id)
        .robot(robot_id)
        .metadata(serde_json::json!({
            "mission_id": mission_id,
            "task_count": task_count
        }))
        .success()
        .emit();
}

pub fn log_admission_rejected(service: &str, robot_id: &str, reason: &str) {
    DomainEvent::new(service, EventCategory::Scheduling, "admission_rejected")
        .entity("robot", robot_id)
        .robot(robot_id)
        .rejected(reason)
        .emit();
}

pub fn log_mission_run_status_changed(service: &str, run_id: &str, robot_id: &str, status: &str) {
    DomainEvent::new(service, EventCategory::MissionRun, "status_changed")
        .entity("mission_run", run_id)
        .robot(robot_id)
        .metadata(serde_json::json!({ "status": status }))
        .success()
        .emit();
}

pub fn log_mission_run_orphaned(service: &str, run_id: &str, robot_id: &str, replaced_by: &str) {
    DomainEvent::new(service, EventCategory::MissionRun, "run_orphaned")
        .entity("mission_run", run_id)
        .robot(robot_id)
        .metadata(serde_json::json!({ "replaced_by": replaced_by }))
        .failure("robot started a new mission run")
        .emit();
}

pub fn log_mission_run_failed(service: &str, run_id: &str, robot_id: &str, reason: &str) {
    DomainEvent::new(service, EventCategory::MissionRun, "run_failed")
        .entity("mission_run", run_id)
        .robot(robot_id)
        .failure(reason)
        .emit();
}

pub fn log_mission_run_finished(service: &str, run_id: &str, robot_id: &str, status: &str) {
    DomainEvent::new(service, EventCategory::MissionRun, "run_finished")
        .entity("mission_run", run_id)
        .robot(robot_id)
        .metadata(serde_json::json!({ "status": status }))
        .success()
        .emit();
}

pub fn log_definition_created(service: &str, definition_id: &str, source_id: &str, source_type: &str) {
    DomainEvent::new(service, EventCategory::MissionDefinition, "definition_created")
        .entity("mission_definition", definition_id)
        .metadata(serde_json::json!({
            "source_id": source_id,
            "source_type": source_type
        }))
        .success()
        .emit();
}

pub fn log_robot_offline(service: &str, robot_id: &str, reason: &str) {
    DomainEvent::new(service, EventCategory::Robot, "robot_offline")
        .entity("robot", robot_id)
        .robot(robot_id)
        .failure(reason)
        .emit();
}

pub fn log_emergency_event(service: &str, event_type: &str, robot_id: &str, area_id: &str, changed: bool) {
    let builder = DomainEvent::new(service, EventCategory::Emergency, event_type)
        .entity("robot", robot_id)
        .robot(robot_id)
        .metadata(serde_json::json!({ "area_id": area_id }));

    if changed {
        builder.success().emit();
    } else {
        builder.skipped().emit();
    }
}
