use crate::domain::schedule::{OverlapPolicy, SchedulePolicy};
use crate::domain::time_angle::{DisplayMode, Half};
use crate::infrastructure::error::InfraError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const APP_JSON: &str = "app.json";
const SUPPORTED_SCHEMA: u64 = 1;
const DEFAULT_DURATION_MINUTES: u16 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub schema: u8,
    pub app_name: String,
    pub display_mode: String,
    pub overlap_policy: String,
    pub default_duration_minutes: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema: 1,
            app_name: "Radial Planner".to_string(),
            display_mode: "24h".to_string(),
            overlap_policy: "allow".to_string(),
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }
}

/// Typed view of `app.json` after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerSettings {
    pub display_mode: DisplayMode,
    pub schedule_policy: SchedulePolicy,
    pub default_duration_minutes: u16,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::TwentyFourHour,
            schedule_policy: SchedulePolicy::default(),
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }
}

impl AppConfig {
    /// `now_minute` seeds the AM/PM half when the configured mode is 12h.
    pub fn settings(&self, now_minute: u16) -> Result<PlannerSettings, InfraError> {
        let display_mode = match self.display_mode.trim().to_ascii_lowercase().as_str() {
            "24h" => DisplayMode::TwentyFourHour,
            "12h" => DisplayMode::TwelveHour(Half::of_minute(now_minute)),
            other => {
                return Err(InfraError::InvalidConfig(format!(
                    "unsupported displayMode: {other}"
                )));
            }
        };
        let overlap = match self.overlap_policy.trim().to_ascii_lowercase().as_str() {
            "allow" => OverlapPolicy::Allow,
            "reject" => OverlapPolicy::Reject,
            other => {
                return Err(InfraError::InvalidConfig(format!(
                    "unsupported overlapPolicy: {other}"
                )));
            }
        };
        if self.default_duration_minutes < 5 {
            return Err(InfraError::InvalidConfig(
                "defaultDurationMinutes must be >= 5".to_string(),
            ));
        }
        Ok(PlannerSettings {
            display_mode,
            schedule_policy: SchedulePolicy { overlap },
            default_duration_minutes: self.default_duration_minutes,
        })
    }
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    let path = config_dir.join(APP_JSON);
    if !path.exists() {
        let formatted = serde_json::to_string_pretty(&AppConfig::default())?;
        fs::write(path, format!("{formatted}\n"))?;
    }
    Ok(())
}

pub fn load_app_config(config_dir: &Path) -> Result<AppConfig, InfraError> {
    let path = config_dir.join(APP_JSON);
    let raw = fs::read_to_string(&path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != SUPPORTED_SCHEMA {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(serde_json::from_value(parsed)?)
}

pub fn save_display_mode(config_dir: &Path, mode: DisplayMode) -> Result<(), InfraError> {
    let mut config = load_app_config(config_dir)?;
    config.display_mode = mode.as_str().to_string();
    let formatted = serde_json::to_string_pretty(&config)?;
    fs::write(config_dir.join(APP_JSON), format!("{formatted}\n"))?;
    Ok(())
}
