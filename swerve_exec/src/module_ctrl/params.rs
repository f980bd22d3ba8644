//! Parameters structure for ModuleCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::f64::consts::{FRAC_PI_2, TAU};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters shared by every swerve module controller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {

    /// Period at which the controller is run.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    // ---- STEER LOOP ----

    /// Proportional gain of the steer position loop.
    ///
    /// Units: volts/radian
    pub steer_k_p: f64,

    /// Derivative gain of the steer position loop.
    ///
    /// Units: volts/(radian/second)
    pub steer_k_d: f64,

    /// Maximum steer rate of the motion profile.
    ///
    /// Units: radians/second
    pub steer_max_vel_rads: f64,

    /// Maximum steer acceleration of the motion profile.
    ///
    /// Units: radians/second^2
    pub steer_max_accel_radss: f64,

    /// Voltage added in the direction of the steer output to overcome static
    /// friction.
    ///
    /// Units: volts
    pub steer_static_bias_volts: f64,

    // ---- DRIVE LOOP ----

    /// Proportional gain of the drive velocity loop.
    ///
    /// Units: volts/(meter/second)
    pub drive_k_p: f64,

    /// Static friction feedforward gain.
    ///
    /// Units: volts
    pub drive_ff_k_s: f64,

    /// Velocity feedforward gain.
    ///
    /// Units: volts/(meter/second)
    pub drive_ff_k_v: f64,

    /// Acceleration feedforward gain.
    ///
    /// Units: volts/(meter/second^2)
    pub drive_ff_k_a: f64,

    // ---- OPTIMISATION ----

    /// Targets further than this from the measured angle are flipped.
    ///
    /// Units: radians
    pub optimise_threshold_rad: f64,

    // ---- MECHANICS ----

    /// Units: meters
    pub wheel_radius_m: f64,

    pub drive_motor_revs_per_wheel_rev: f64,

    pub steer_motor_revs_per_module_rev: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.02,

            steer_k_p: 3.0,
            steer_k_d: 0.0,
            steer_max_vel_rads: 7.8 * TAU,
            steer_max_accel_radss: 400.0 * TAU,
            steer_static_bias_volts: 0.04,

            drive_k_p: 4.6,
            drive_ff_k_s: 0.055,
            drive_ff_k_v: 2.6826,
            drive_ff_k_a: 0.1188,

            optimise_threshold_rad: FRAC_PI_2,

            wheel_radius_m: 0.0508,
            drive_motor_revs_per_wheel_rev: 6.75,
            steer_motor_revs_per_module_rev: 150.0 / 7.0,
        }
    }
}
