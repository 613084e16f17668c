//! Robot and robot model types for the fleet
//!
//! This module defines:
//! - Robot types and per-type thresholds
//! - The robot aggregate mutated by scheduling, dispatch and emergency flows
//! - Readiness checks used before a mission may be scheduled

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::geometry::Pose;

// ============================================================================
// ROBOT MODEL
// ============================================================================

/// Type of robot in the fleet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RobotType {
    TaurobInspector,
    TaurobOperator,
    ExR2,
    AnymalX,
    AnymalD,
    Robot,
    Turtlebot,
}

impl fmt::Display for RobotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Per-type thresholds and statistics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RobotModel {
    pub id: String,
    pub robot_type: RobotType,
    pub battery_warning_threshold: Option<f32>,
    /// Minimum battery level (percent) required to start a mission
    pub battery_mission_start_threshold: Option<f32>,
    pub lower_pressure_warning_threshold: Option<f32>,
    pub upper_pressure_warning_threshold: Option<f32>,
    /// Rolling average of seconds spent per task, None until measured
    pub average_duration_per_tag: Option<f32>,
}

/// Outcome of the pressure readiness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureCheck {
    WithinRange,
    TooLow,
    TooHigh,
}

impl RobotModel {
    pub fn new(robot_type: RobotType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            robot_type,
            battery_warning_threshold: None,
            battery_mission_start_threshold: None,
            lower_pressure_warning_threshold: None,
            upper_pressure_warning_threshold: None,
            average_duration_per_tag: None,
        }
    }

    /// An unknown battery level fails the check when a threshold is configured
    pub fn battery_allows_mission_start(&self, battery_level: Option<f32>) -> bool {
        match self.battery_mission_start_threshold {
            None => true,
            Some(threshold) => battery_level.map_or(false, |level| level >= threshold),
        }
    }

    /// An unknown pressure level counts as too low when a lower bound is configured
    pub fn check_pressure(&self, pressure_level: Option<f32>) -> PressureCheck {
        if let Some(lower) = self.lower_pressure_warning_threshold {
            match pressure_level {
                Some(level) if level >= lower => {}
                _ => return PressureCheck::TooLow,
            }
        }
        if let (Some(upper), Some(level)) = (self.upper_pressure_warning_threshold, pressure_level) {
            if level > upper {
                return PressureCheck::TooHigh;
            }
        }
        PressureCheck::WithinRange
    }
}

// ============================================================================
// ROBOT
// ============================================================================

/// Robot availability as seen by the fleet manager
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    #[default]
    Available,
    Busy,
    Offline,
    Blocked,
}

/// A robot registered in the fleet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Robot {
    pub id: String,
    pub name: String,
    pub isar_id: String,
    pub serial_number: String,
    pub robot_type: RobotType,

    pub current_installation_code: String,
    pub current_area_id: Option<String>,

    pub battery_level: Option<f32>,
    pub pressure_level: Option<f32>,
    pub pose: Option<Pose>,

    pub status: RobotStatus,
    pub isar_connected: bool,
    pub current_mission_id: Option<String>,
    pub mission_queue_frozen: bool,

    /// Optimistic concurrency token, bumped by every stored update
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl Robot {
    pub fn new(name: impl Into<String>, robot_type: RobotType, installation_code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            isar_id: Uuid::new_v4().to_string(),
            serial_number: String::new(),
            robot_type,
            current_installation_code: installation_code.into(),
            current_area_id: None,
            battery_level: None,
            pressure_level: None,
            pose: None,
            status: RobotStatus::Available,
            isar_connected: true,
            current_mission_id: None,
            mission_queue_frozen: false,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    /// Ready to receive the next mission from the queue
    pub fn is_available_for_dispatch(&self) -> bool {
        self.status == RobotStatus::Available && self.isar_connected
    }

    pub fn mark_offline(&mut self) {
        self.status = RobotStatus::Offline;
        self.isar_connected = false;
    }
}
