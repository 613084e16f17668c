//! MissionHub Observability Library
//!
//! Logging infrastructure shared by the MissionHub crates.
//!
//! # Features
//! - Structured JSON or pretty logging with a consistent schema
//! - Domain events for mission, robot and emergency activity
//! - Logging macros for robot-control calls, admission checks and retries

pub mod domain_events;
pub mod init;
pub mod macros;

pub use domain_events::*;
pub use init::*;

// Re-export tracing for convenience
pub use tracing::{debug, error, info, instrument, trace, warn, Instrument, Level};
