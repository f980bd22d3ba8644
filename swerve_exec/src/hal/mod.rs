//! # Hardware abstraction module
//!
//! The controllers in this crate never talk to a concrete motor controller
//! or encoder. Instead each module's hardware is accessed through the
//! [`ModuleHw`] capability trait, and the chassis gyro through [`RateGyro`].
//! Running on real hardware or in simulation is a matter of which
//! implementation is handed to the controllers at construction.
//!
//! All values crossing these traits are already in calibrated physical units
//! (radians, meters, volts), the conversion factors being applied by the
//! implementation according to the [`MotorConfig`] it was given.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod ideal;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::chassis_kin::{ChassisVelocity, WheelState};

pub use ideal::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Capabilities of the hardware of one swerve module: a steer motor with a
/// relative encoder, a drive motor with a relative encoder, and an absolute
/// angle sensor on the steering shaft.
pub trait ModuleHw {
    /// Apply the configuration for the steer and drive motors.
    ///
    /// Called once at construction, never during cyclic processing.
    fn configure(&mut self, steer: &MotorConfig, drive: &MotorConfig) -> Result<(), HalError>;

    /// Read the absolute angle sensor, before any calibration offset is
    /// removed.
    ///
    /// Units: radians, in [0, 2pi)
    fn abs_angle_rad(&mut self) -> f64;

    /// Read the relative steer encoder position.
    ///
    /// Units: radians, unbounded
    fn steer_pos_rad(&mut self) -> f64;

    /// Overwrite the relative steer encoder position.
    fn set_steer_pos_rad(&mut self, pos_rad: f64);

    /// Read the relative drive encoder position.
    ///
    /// Units: meters
    fn drive_pos_m(&mut self) -> f64;

    /// Overwrite the relative drive encoder position.
    fn set_drive_pos_m(&mut self, pos_m: f64);

    /// Read the velocity reported by the drive motor controller.
    ///
    /// This signal lags the true velocity and is not used for control.
    ///
    /// Units: meters/second
    fn drive_vel_ms(&mut self) -> f64;

    /// Overwrite the velocity reported by the drive motor controller.
    fn set_drive_vel_ms(&mut self, vel_ms: f64);

    /// Demand a voltage from the steer motor.
    fn set_steer_volts(&mut self, volts: f64);

    /// Demand a voltage from the drive motor.
    fn set_drive_volts(&mut self, volts: f64);

    /// Notification of the target the module controller is tracking, sent
    /// after the actuator demands for the cycle have been written.
    ///
    /// Real hardware ignores this. Models without physical sensors use it to
    /// report the commanded target as the measured state.
    fn track_target(&mut self, _target: &WheelState) {}
}

/// A chassis rate gyro.
pub trait RateGyro {
    /// Read the rotation rate of the chassis about Z+.
    ///
    /// Units: radians/second
    fn rate_rads(&mut self) -> f64;

    /// Notification of the chassis velocity commanded this cycle, ignored by
    /// real hardware.
    fn track_command(&mut self, _velocity: &ChassisVelocity) {}
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Configuration applied to a single motor controller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotorConfig {
    /// Brake, rather than coast, when no voltage is demanded.
    pub brake: bool,

    /// Reverse the positive direction of the motor and its encoder.
    pub inverted: bool,

    /// Factor converting motor revolutions into position units.
    pub pos_factor: f64,

    /// Factor converting motor RPM into velocity units.
    pub vel_factor: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors from the hardware layer.
#[derive(Debug, thiserror::Error)]
pub enum HalError {
    #[error("Motor controller {0} did not accept its configuration: {1}")]
    ConfigRejected(String, String),

    #[error("Invalid conversion factor {0} (must be finite and non-zero)")]
    InvalidFactor(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotorConfig {
    /// Configuration for a drive motor.
    ///
    /// Positions are reported in meters travelled by the wheel and velocities
    /// in meters/second.
    pub fn drive(wheel_radius_m: f64, motor_revs_per_wheel_rev: f64) -> Self {
        let pos_factor = std::f64::consts::TAU * wheel_radius_m / motor_revs_per_wheel_rev;
        Self {
            brake: true,
            inverted: true,
            pos_factor,
            vel_factor: pos_factor / 60.0,
        }
    }

    /// Configuration for a steer motor.
    ///
    /// Positions are reported in radians of module rotation.
    pub fn steer(motor_revs_per_module_rev: f64) -> Self {
        let pos_factor = std::f64::consts::TAU / motor_revs_per_module_rev;
        Self {
            brake: true,
            inverted: true,
            pos_factor,
            vel_factor: pos_factor / 60.0,
        }
    }

    /// Check the conversion factors are usable.
    pub fn validate(&self) -> Result<(), HalError> {
        for f in [self.pos_factor, self.vel_factor].iter() {
            if !f.is_finite() || *f == 0.0 {
                return Err(HalError::InvalidFactor(*f));
            }
        }
        Ok(())
    }
}
