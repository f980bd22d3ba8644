//! Idealised hardware models
//!
//! Used when no physical sensors are present. Every module instantly reaches
//! the last target its controller commanded, and the gyro reports the last
//! commanded chassis rotation rate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use super::{HalError, MotorConfig, ModuleHw, RateGyro};
use crate::chassis_kin::{ChassisVelocity, WheelState};
use util::maths::rem_euclid;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A swerve module whose measured state always equals the last commanded
/// target.
#[derive(Clone, Debug)]
pub struct IdealModuleHw {
    /// Cycle period used to integrate drive position.
    ///
    /// Units: seconds
    period_s: f64,

    /// Calibration offset of the modelled absolute sensor.
    ///
    /// Units: radians
    abs_offset_rad: f64,

    /// True physical angle of the module.
    angle_rad: f64,

    /// Physical angle at which the relative steer encoder reads zero.
    steer_enc_zero_rad: f64,

    drive_pos_m: f64,
    drive_vel_ms: f64,

    steer_volts: f64,
    drive_volts: f64,

    config: Option<(MotorConfig, MotorConfig)>,
}

/// A gyro reporting the last commanded chassis rotation rate.
#[derive(Clone, Debug, Default)]
pub struct IdealGyro {
    rate_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl IdealModuleHw {
    /// Create a new ideal module pointing straight ahead.
    pub fn new(period_s: f64, abs_offset_rad: f64) -> Self {
        Self::with_angle(period_s, abs_offset_rad, 0.0)
    }

    /// Create a new ideal module which is physically at `angle_rad` but whose
    /// relative steer encoder reads zero, as it would at power up.
    pub fn with_angle(period_s: f64, abs_offset_rad: f64, angle_rad: f64) -> Self {
        Self {
            period_s,
            abs_offset_rad,
            angle_rad,
            steer_enc_zero_rad: angle_rad,
            drive_pos_m: 0.0,
            drive_vel_ms: 0.0,
            steer_volts: 0.0,
            drive_volts: 0.0,
            config: None,
        }
    }

    /// The last steer voltage demanded.
    pub fn steer_volts(&self) -> f64 {
        self.steer_volts
    }

    /// The last drive voltage demanded.
    pub fn drive_volts(&self) -> f64 {
        self.drive_volts
    }

    /// The configuration applied to the (steer, drive) motors, if any.
    pub fn config(&self) -> Option<&(MotorConfig, MotorConfig)> {
        self.config.as_ref()
    }
}

impl ModuleHw for IdealModuleHw {
    fn configure(&mut self, steer: &MotorConfig, drive: &MotorConfig) -> Result<(), HalError> {
        steer.validate()?;
        drive.validate()?;
        self.config = Some((*steer, *drive));
        Ok(())
    }

    fn abs_angle_rad(&mut self) -> f64 {
        rem_euclid(self.angle_rad + self.abs_offset_rad, std::f64::consts::TAU)
    }

    fn steer_pos_rad(&mut self) -> f64 {
        self.angle_rad - self.steer_enc_zero_rad
    }

    fn set_steer_pos_rad(&mut self, pos_rad: f64) {
        self.steer_enc_zero_rad = self.angle_rad - pos_rad;
    }

    fn drive_pos_m(&mut self) -> f64 {
        self.drive_pos_m
    }

    fn set_drive_pos_m(&mut self, pos_m: f64) {
        self.drive_pos_m = pos_m;
    }

    fn drive_vel_ms(&mut self) -> f64 {
        self.drive_vel_ms
    }

    fn set_drive_vel_ms(&mut self, vel_ms: f64) {
        self.drive_vel_ms = vel_ms;
    }

    fn set_steer_volts(&mut self, volts: f64) {
        self.steer_volts = volts;
    }

    fn set_drive_volts(&mut self, volts: f64) {
        self.drive_volts = volts;
    }

    fn track_target(&mut self, target: &WheelState) {
        // Move the short way so the relative encoder stays continuous
        self.angle_rad += util::maths::get_ang_dist(self.angle_rad, target.angle_rad);

        self.drive_vel_ms = target.speed_ms;
        self.drive_pos_m += target.speed_ms * self.period_s;

        trace!(
            "Ideal module at {:.4} rad, {:.4} m/s, {:.4} m",
            self.angle_rad, self.drive_vel_ms, self.drive_pos_m
        );
    }
}

impl IdealGyro {
    /// The rate the gyro will report on the next read.
    pub fn last_rate_rads(&self) -> f64 {
        self.rate_rads
    }
}

impl RateGyro for IdealGyro {
    fn rate_rads(&mut self) -> f64 {
        self.rate_rads
    }

    fn track_command(&mut self, velocity: &ChassisVelocity) {
        self.rate_rads = velocity.turn_rate_rads;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    #[test]
    fn test_abs_angle_includes_offset() {
        let mut hw = IdealModuleHw::with_angle(0.02, 2.0, -FRAC_PI_2);
        let abs = hw.abs_angle_rad();
        assert!((abs - (2.0 - FRAC_PI_2)).abs() < 1e-12);

        let mut hw = IdealModuleHw::with_angle(0.02, 0.5, -1.0);
        let abs = hw.abs_angle_rad();
        assert!(abs >= 0.0 && abs < TAU);
        assert!((abs - (TAU - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_relative_encoder_sync() {
        let mut hw = IdealModuleHw::with_angle(0.02, 0.0, 1.0);
        assert_eq!(hw.steer_pos_rad(), 0.0);

        hw.set_steer_pos_rad(1.0);
        assert!((hw.steer_pos_rad() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tracks_target() {
        let mut hw = IdealModuleHw::new(0.02, 0.0);

        hw.track_target(&WheelState::new(2.0, PI - 0.1));
        hw.track_target(&WheelState::new(2.0, -PI + 0.1));

        // Relative encoder moved the short way, through pi
        assert!((hw.steer_pos_rad() - (PI + 0.1)).abs() < 1e-12);
        assert!((hw.drive_pos_m() - 0.08).abs() < 1e-12);
        assert_eq!(hw.drive_vel_ms(), 2.0);
    }

    #[test]
    fn test_gyro_tracks_command() {
        let mut gyro = IdealGyro::default();
        assert_eq!(gyro.rate_rads(), 0.0);
        gyro.track_command(&ChassisVelocity::new(1.0, 0.0, -0.7));
        assert_eq!(gyro.rate_rads(), -0.7);
    }
}
