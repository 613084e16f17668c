use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Settings consumed by the scheduling engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub service_name: String,
    /// Directory holding uploaded custom mission task lists
    pub custom_mission_store_dir: PathBuf,
    /// Attempts for a robot update before a version conflict is surfaced
    pub robot_update_retries: u32,
    /// Window of recent runs feeding the per-tag duration statistic
    pub average_duration_window_days: i64,
    pub log_format: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "missionhub-scheduler".to_string(),
            custom_mission_store_dir: PathBuf::from("custom-missions"),
            robot_update_retries: 3,
            average_duration_window_days: 14,
            log_format: "pretty".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        if dotenv::dotenv().is_ok() {
            tracing::debug!("Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            service_name: lookup("MISSIONHUB_SERVICE_NAME").unwrap_or(defaults.service_name),
            custom_mission_store_dir: lookup("CUSTOM_MISSION_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.custom_mission_store_dir),
            robot_update_retries: parse_or(&lookup, "ROBOT_UPDATE_RETRIES", defaults.robot_update_retries)?,
            average_duration_window_days: parse_or(
                &lookup,
                "AVERAGE_DURATION_WINDOW_DAYS",
                defaults.average_duration_window_days,
            )?,
            log_format: lookup("LOG_FORMAT").unwrap_or(defaults.log_format),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CUSTOM_MISSION_STORE_DIR", "/var/lib/missionhub"),
            ("ROBOT_UPDATE_RETRIES", " 5 "),
            ("AVERAGE_DURATION_WINDOW_DAYS", "30"),
        ]);
        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.custom_mission_store_dir, PathBuf::from("/var/lib/missionhub"));
        assert_eq!(config.robot_update_retries, 5);
        assert_eq!(config.average_duration_window_days, 30);
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = AppConfig::from_lookup(|key| (key == "ROBOT_UPDATE_RETRIES").then(|| "many".to_string()))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "ROBOT_UPDATE_RETRIES".to_string(),
                value: "many".to_string()
            }
        );
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("MISSIONHUB_SERVICE_NAME", "scheduler-test");
        let config = AppConfig::from_env().unwrap();
        std::env::remove_var("MISSIONHUB_SERVICE_NAME");

        assert_eq!(config.service_name, "scheduler-test");
    }
}
