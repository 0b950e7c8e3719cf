//! Global configuration models for `.microwave/config.toml`.
//!
//! This module defines the structure of the global configuration file that
//! controls cook timing, animation clips, model lookup and the names of the
//! interactive regions of the appliance.

use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;
use ts_rs::TS;

/// Represents global settings from `.microwave/config.toml`.
///
/// Every field has a default, so an empty file (or no file) is valid.
///
/// # Example
///
/// ```toml
/// # .microwave/config.toml
/// cook-duration-secs = 10
/// models-dir = "models"
///
/// [clips.door]
/// name = "DoorOpenCloseAnimation"
/// duration-ms = 1000
///
/// [regions]
/// door = "microwave_door"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Length of one cook cycle when start is pressed without a duration.
    #[serde(default = "default_cook_duration_secs")]
    pub cook_duration_secs: u64,

    /// Directory holding `{item}_v{stage}.glb` model files.
    ///
    /// Relative paths are resolved against the project root.
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    #[serde(default)]
    pub clips: ClipSettings,

    #[serde(default)]
    pub regions: RegionNames,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            cook_duration_secs: default_cook_duration_secs(),
            models_dir: default_models_dir(),
            clips: ClipSettings::default(),
            regions: RegionNames::default(),
        }
    }
}

fn default_cook_duration_secs() -> u64 {
    10
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

/// A named animation clip and how long one playback takes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct ClipConfig {
    pub name: String,
    pub duration_ms: u64,
}

/// The two clips the appliance drives.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct ClipSettings {
    #[serde(default = "default_door_clip")]
    pub door: ClipConfig,

    #[serde(default = "default_timer_clip")]
    pub timer: ClipConfig,
}

impl Default for ClipSettings {
    fn default() -> Self {
        Self {
            door: default_door_clip(),
            timer: default_timer_clip(),
        }
    }
}

fn default_door_clip() -> ClipConfig {
    ClipConfig {
        name: "DoorOpenCloseAnimation".to_string(),
        duration_ms: 1_000,
    }
}

fn default_timer_clip() -> ClipConfig {
    ClipConfig {
        name: "timer_animation".to_string(),
        duration_ms: 10_000,
    }
}

/// Mesh names of the interactive regions a pointer hit can land on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct RegionNames {
    #[serde(default = "default_door_region")]
    pub door: String,

    #[serde(default = "default_start_region")]
    pub start: String,

    #[serde(default = "default_stop_region")]
    pub stop: String,

    #[serde(default = "default_reset_region")]
    pub reset: String,
}

impl Default for RegionNames {
    fn default() -> Self {
        Self {
            door: default_door_region(),
            start: default_start_region(),
            stop: default_stop_region(),
            reset: default_reset_region(),
        }
    }
}

fn default_door_region() -> String {
    "microwave_door".to_string()
}

fn default_start_region() -> String {
    "start_button".to_string()
}

fn default_stop_region() -> String {
    "stop_button".to_string()
}

fn default_reset_region() -> String {
    "reset_button".to_string()
}
