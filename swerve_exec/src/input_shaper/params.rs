//! Parameters structure for InputShaper

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::DriveMode;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for input shaping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {

    /// Axis values with a smaller magnitude than this are zeroed.
    pub deadband: f64,

    /// Maximum rate of change of the translation axes.
    ///
    /// Units: 1/second
    pub translation_slew_rate: f64,

    /// Maximum rate of change of the rotation axis.
    ///
    /// Units: 1/second
    pub rotation_slew_rate: f64,

    /// Speed commanded by a full deflection of the translation axes.
    ///
    /// Units: meters/second
    pub max_linear_speed_ms: f64,

    /// Rate commanded by a full deflection of the rotation axis.
    ///
    /// Units: radians/second
    pub max_angular_rate_rads: f64,

    pub invert_x: bool,
    pub invert_y: bool,
    pub invert_rot: bool,

    /// Frame commands are interpreted in at start-up.
    pub drive_mode: DriveMode,

    /// Units: seconds
    pub cycle_period_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            deadband: 0.07,
            translation_slew_rate: 3.0,
            rotation_slew_rate: 2.0,
            max_linear_speed_ms: 4.0,
            max_angular_rate_rads: 1920f64.to_radians(),
            invert_x: false,
            invert_y: false,
            invert_rot: false,
            drive_mode: DriveMode::FieldRelative,
            cycle_period_s: 0.02,
        }
    }
}
