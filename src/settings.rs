//! Tunable constants and presentation preferences
//!
//! Persisted separately from best scores (LocalStorage on web, a JSON file natively).

use std::fmt;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Physics and input constants
///
/// Defaults give the built-in course its feel. Every value is per frame,
/// the simulation does not scale by elapsed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub ball_radius: f32,
    pub gravity: Vec3,

    // === Shot ===
    pub max_drag_distance: f32,
    pub min_shot_power: f32,
    pub shot_power_scale: f32,

    // === Contacts ===
    pub ground_bounce: f32,
    pub collision_damping: f32,
    pub collision_skin: f32,
    pub walkable_normal_y: f32,
    pub flat_normal_y: f32,
    pub ground_friction: f32,
    pub sand_friction: f32,
    pub sand_tolerance: f32,
    pub vertical_settle: f32,

    // === Hole ===
    pub hole_capture_speed_sq: f32,
    pub hole_gravity_range: f32,
    pub hole_gravity_speed_sq: f32,
    pub hole_gravity_pull: f32,
    pub hole_gravity_damping: f32,

    // === Termination ===
    pub out_of_bounds_y: f32,
    pub rest_speed_sq: f32,
    pub rest_height_slack: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ball_radius: BALL_RADIUS,
            gravity: GRAVITY,

            max_drag_distance: MAX_DRAG_DISTANCE,
            min_shot_power: MIN_SHOT_POWER,
            shot_power_scale: SHOT_POWER_SCALE,

            ground_bounce: GROUND_BOUNCE,
            collision_damping: COLLISION_DAMPING,
            collision_skin: COLLISION_SKIN,
            walkable_normal_y: WALKABLE_NORMAL_Y,
            flat_normal_y: FLAT_NORMAL_Y,
            ground_friction: GROUND_FRICTION,
            sand_friction: SAND_FRICTION,
            sand_tolerance: SAND_TOLERANCE,
            vertical_settle: VERTICAL_SETTLE,

            hole_capture_speed_sq: HOLE_CAPTURE_SPEED_SQ,
            hole_gravity_range: HOLE_GRAVITY_RANGE,
            hole_gravity_speed_sq: HOLE_GRAVITY_SPEED_SQ,
            hole_gravity_pull: HOLE_GRAVITY_PULL,
            hole_gravity_damping: HOLE_GRAVITY_DAMPING,

            out_of_bounds_y: OUT_OF_BOUNDS_Y,
            rest_speed_sq: REST_SPEED_SQ,
            rest_height_slack: REST_HEIGHT_SLACK,
        }
    }
}

impl Tuning {
    /// Check that the values can drive a sane simulation
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("ball_radius", self.ball_radius),
            ("max_drag_distance", self.max_drag_distance),
            ("shot_power_scale", self.shot_power_scale),
            ("collision_skin", self.collision_skin),
            ("hole_gravity_range", self.hole_gravity_range),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        let ranged = [
            ("collision_damping", self.collision_damping, 1.0),
            ("ground_friction", self.ground_friction, 1.0),
            ("sand_friction", self.sand_friction, 1.0),
            ("hole_gravity_damping", self.hole_gravity_damping, 1.0),
            ("min_shot_power", self.min_shot_power, 100.0),
        ];
        for (field, value, max) in ranged {
            if !(0.0..=max).contains(&value) {
                return Err(TuningError::OutOfRange { field, value, max });
            }
        }

        if !self.gravity.is_finite() {
            return Err(TuningError::NonFinite { field: "gravity" });
        }
        Ok(())
    }
}

/// A `Tuning` value that would break the simulation
#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    NotPositive { field: &'static str, value: f32 },
    /// Outside `[0, max]`
    OutOfRange { field: &'static str, value: f32, max: f32 },
    NonFinite { field: &'static str },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::NotPositive { field, value } => write!(f, "{field} must be positive, got {value}"),
            TuningError::OutOfRange { field, value, max } => {
                write!(f, "{field} must lie in [0, {max}], got {value}")
            }
            TuningError::NonFinite { field } => write!(f, "{field} must be finite"),
        }
    }
}

impl std::error::Error for TuningError {}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Simulation constants
    pub tuning: Tuning,

    // === Presentation ===
    /// Draw the dotted aim line while charging
    pub show_aim_line: bool,
    /// Draw the spinning ring under a playable ball
    pub show_indicator: bool,
    /// Camera follows the ball while it rolls
    pub follow_camera: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tuning: Tuning::default(),
            show_aim_line: true,
            show_indicator: true,
            follow_camera: true,
        }
    }
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "mini_golf_settings";

    /// Parse settings JSON, falling back to defaults for anything missing
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read settings from a JSON file; defaults if absent, unreadable or invalid
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("No settings at {} ({e}), using defaults", path.display());
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => match settings.tuning.validate() {
                Ok(()) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(reason) => {
                    log::warn!("Rejected tuning in {}: {reason}", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Malformed settings in {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = Self::from_json(&json) {
                    if settings.tuning.validate().is_ok() {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }
}
