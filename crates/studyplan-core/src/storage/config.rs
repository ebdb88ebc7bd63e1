//! TOML-based application configuration.
//!
//! Stores planner preferences including:
//! - Daily study-minutes target and lane admission limits
//! - Readiness windows and the fallback velocity
//! - Remediation thresholds
//! - Dataset location override
//!
//! Configuration is stored at `~/.config/studyplan/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::readiness::ReadinessConfig;
use crate::remediation::RemediationConfig;
use crate::scheduler::SchedulerConfig;

/// Daily plan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_daily_minutes_target")]
    pub daily_minutes_target: u32,
    #[serde(default = "default_max_tasks_per_lane")]
    pub max_tasks_per_lane: usize,
    /// Multiplier on each lane budget that admitted minutes may reach.
    #[serde(default = "default_budget_tolerance")]
    pub budget_tolerance: f64,
    /// ExamBuild tasks above this urgency may spill into DueSoon.
    #[serde(default = "default_overflow_urgency")]
    pub overflow_urgency: f64,
}

/// Readiness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessSettings {
    #[serde(default = "default_daily_minutes")]
    pub default_daily_minutes: f64,
    #[serde(default = "default_velocity_window_days")]
    pub velocity_window_days: i64,
    #[serde(default = "default_recency_window_days")]
    pub recency_window_days: i64,
}

/// Remediation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationSettings {
    #[serde(default = "default_error_threshold")]
    pub error_threshold: usize,
    #[serde(default = "default_remediation_window_days")]
    pub window_days: i64,
    #[serde(default = "default_remediation_task_minutes")]
    pub task_minutes: u32,
}

/// Data file locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// Dataset JSON path; defaults to `dataset.json` in the data directory.
    #[serde(default)]
    pub dataset_path: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studyplan/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub readiness: ReadinessSettings,
    #[serde(default)]
    pub remediation: RemediationSettings,
    #[serde(default)]
    pub data: DataConfig,
}

// Default functions
fn default_daily_minutes_target() -> u32 {
    120
}
fn default_max_tasks_per_lane() -> usize {
    5
}
fn default_budget_tolerance() -> f64 {
    1.2
}
fn default_overflow_urgency() -> f64 {
    50.0
}
fn default_daily_minutes() -> f64 {
    60.0
}
fn default_velocity_window_days() -> i64 {
    30
}
fn default_recency_window_days() -> i64 {
    14
}
fn default_error_threshold() -> usize {
    3
}
fn default_remediation_window_days() -> i64 {
    7
}
fn default_remediation_task_minutes() -> u32 {
    30
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            daily_minutes_target: default_daily_minutes_target(),
            max_tasks_per_lane: default_max_tasks_per_lane(),
            budget_tolerance: default_budget_tolerance(),
            overflow_urgency: default_overflow_urgency(),
        }
    }
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            default_daily_minutes: default_daily_minutes(),
            velocity_window_days: default_velocity_window_days(),
            recency_window_days: default_recency_window_days(),
        }
    }
}

impl Default for RemediationSettings {
    fn default() -> Self {
        Self {
            error_threshold: default_error_threshold(),
            window_days: default_remediation_window_days(),
            task_minutes: default_remediation_task_minutes(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    // Optional fields serialize as null and take strings.
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Dataset path, from config or the data directory.
    pub fn dataset_path(&self) -> Option<PathBuf> {
        match &self.data.dataset_path {
            Some(p) => Some(PathBuf::from(p)),
            None => data_dir().ok().map(|d| d.join("dataset.json")),
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            max_tasks_per_lane: self.planner.max_tasks_per_lane,
            budget_tolerance: self.planner.budget_tolerance,
            overflow_urgency: self.planner.overflow_urgency,
        }
    }

    pub fn readiness_config(&self) -> ReadinessConfig {
        ReadinessConfig {
            recency_window_days: self.readiness.recency_window_days,
            velocity_window_days: self.readiness.velocity_window_days,
            default_daily_minutes: self.readiness.default_daily_minutes,
        }
    }

    pub fn remediation_config(&self) -> RemediationConfig {
        RemediationConfig {
            error_threshold: self.remediation.error_threshold,
            window_days: self.remediation.window_days,
            task_minutes: self.remediation.task_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.planner.daily_minutes_target, 120);
        assert_eq!(parsed.remediation.error_threshold, 3);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[planner]\ndaily_minutes_target = 90\n").unwrap();
        assert_eq!(parsed.planner.daily_minutes_target, 90);
        assert_eq!(parsed.readiness.recency_window_days, 14);
        assert_eq!(parsed.readiness.default_daily_minutes, 60.0);
        assert!(parsed.data.dataset_path.is_none());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("planner.daily_minutes_target").as_deref(), Some("120"));
        assert_eq!(cfg.get("remediation.window_days").as_deref(), Some("7"));
        assert!(cfg.get("planner.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set("planner.daily_minutes_target", "150").unwrap();
        assert_eq!(cfg.planner.daily_minutes_target, 150);
        cfg.set("readiness.default_daily_minutes", "45.5").unwrap();
        assert_eq!(cfg.readiness.default_daily_minutes, 45.5);
    }

    #[test]
    fn scheduler_settings_flow_into_scheduler_config() {
        let mut cfg = Config::default();
        assert_eq!(cfg.scheduler_config().max_tasks_per_lane, 5);
        assert_eq!(cfg.scheduler_config().budget_tolerance, 1.2);
        cfg.set("planner.max_tasks_per_lane", "2").unwrap();
        cfg.set("planner.budget_tolerance", "1").unwrap();
        let sched = cfg.scheduler_config();
        assert_eq!(sched.max_tasks_per_lane, 2);
        assert_eq!(sched.budget_tolerance, 1.0);
        assert_eq!(sched.overflow_urgency, 50.0);
    }

    #[test]
    fn set_fills_optional_string() {
        let mut cfg = Config::default();
        cfg.set("data.dataset_path", "/tmp/study.json").unwrap();
        assert_eq!(cfg.data.dataset_path.as_deref(), Some("/tmp/study.json"));
        assert_eq!(cfg.dataset_path(), Some(PathBuf::from("/tmp/study.json")));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("planner.nonexistent", "1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn set_rejects_invalid_number() {
        let mut cfg = Config::default();
        let err = cfg.set("planner.daily_minutes_target", "lots").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.planner.daily_minutes_target, 120);
        assert!(path.exists());
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("remediation.error_threshold", "5").unwrap();
        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.remediation.error_threshold, 5);
        assert_eq!(loaded.remediation_config().error_threshold, 5);
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "planner = [").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::LoadFailed { .. })));
    }
}
