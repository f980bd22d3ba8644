//! Implementations for the InputShaper state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::Serialize;

// Internal
use super::{
    deadband, normalise_translation,
    AxisSample, DriveDemand, DriveMode, InputShaperError, Params, SlewRateLimiter
};
use crate::chassis_kin::ChassisVelocity;
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Input shaping module state
pub struct InputShaper {
    params: Params,

    mode: DriveMode,

    x_limiter: SlewRateLimiter,
    y_limiter: SlewRateLimiter,
    rot_limiter: SlewRateLimiter,
}

/// Input data to input shaping.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputData {
    /// The joystick axes sampled this cycle.
    pub axes: AxisSample,

    /// The heading to hold when in `DriveMode::FieldRelativeHeading`. If
    /// `None` in that mode the rotation axis is used as in
    /// `DriveMode::FieldRelative`.
    pub target_heading_rad: Option<f64>,
}

/// Status report for input shaping.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// One or more axes were not finite and were treated as zero.
    pub non_finite_input: bool,

    /// The translation demand was outside the unit disk and was clamped.
    pub translation_clamped: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InputShaper {
    pub fn new(params: Params) -> Self {
        let period_s = params.cycle_period_s;

        Self {
            mode: params.drive_mode,
            x_limiter: SlewRateLimiter::new(params.translation_slew_rate, period_s),
            y_limiter: SlewRateLimiter::new(params.translation_slew_rate, period_s),
            rot_limiter: SlewRateLimiter::new(params.rotation_slew_rate, period_s),
            params,
        }
    }

    pub fn drive_mode(&self) -> DriveMode {
        self.mode
    }

    pub fn set_drive_mode(&mut self, mode: DriveMode) {
        if mode != self.mode {
            info!("Drive mode changed from {:?} to {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    /// Current (x, y, rot) limiter outputs.
    pub fn limiter_values(&self) -> (f64, f64, f64) {
        (
            self.x_limiter.value(),
            self.y_limiter.value(),
            self.rot_limiter.value()
        )
    }

    fn reset_limiters(&mut self) {
        self.x_limiter.reset(0.0);
        self.y_limiter.reset(0.0);
        self.rot_limiter.reset(0.0);
    }

    fn validate_params(&self) -> Result<(), InputShaperError> {
        let p = &self.params;
        let checks = [
            ("deadband", p.deadband, p.deadband >= 0.0 && p.deadband < 1.0),
            ("translation_slew_rate", p.translation_slew_rate, p.translation_slew_rate > 0.0),
            ("rotation_slew_rate", p.rotation_slew_rate, p.rotation_slew_rate > 0.0),
            ("max_linear_speed_ms", p.max_linear_speed_ms, p.max_linear_speed_ms >= 0.0),
            ("max_angular_rate_rads", p.max_angular_rate_rads, p.max_angular_rate_rads >= 0.0),
            ("cycle_period_s", p.cycle_period_s, p.cycle_period_s > 0.0),
        ];

        for (name, value, ok) in checks.iter() {
            if !ok || !value.is_finite() {
                return Err(InputShaperError::InvalidParam(*name, *value));
            }
        }

        Ok(())
    }

    /// Apply inversion and the deadband to a raw axis, treating non-finite
    /// values as zero.
    fn condition(&self, value: f64, invert: bool, report: &mut StatusReport) -> f64 {
        let value = if value.is_finite() {
            value
        }
        else {
            report.non_finite_input = true;
            0.0
        };

        let value = if invert { -value } else { value };

        deadband(value, self.params.deadband)
    }
}

impl State for InputShaper {
    type InitData = ();
    type InitError = InputShaperError;

    type InputData = InputData;
    type OutputData = DriveDemand;
    type StatusReport = StatusReport;
    type ProcError = InputShaperError;

    /// Initialise the shaper, zeroing all limiter state.
    fn init(&mut self, _init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.validate_params()?;
        self.reset_limiters();
        info!("InputShaper initialised in {:?} mode", self.mode);
        Ok(())
    }

    /// Shape one sample of the joystick axes.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();
        let axes = &input_data.axes;

        let x = self.condition(axes.x, self.params.invert_x, &mut report);
        let y = self.condition(axes.y, self.params.invert_y, &mut report);
        let rot = self.condition(axes.rot, self.params.invert_rot, &mut report);

        if report.non_finite_input {
            warn!("Non-finite joystick axis in {:?}, treated as zero", axes);
        }

        let x = self.x_limiter.calculate(x);
        let y = self.y_limiter.calculate(y);
        let rot = self.rot_limiter.calculate(rot);

        // Forward is joystick y, strafe is joystick x
        let (fwd_ms, strafe_ms, clamped) = normalise_translation(
            y, x, self.params.max_linear_speed_ms
        );
        report.translation_clamped = clamped;

        let velocity = ChassisVelocity::new(
            fwd_ms,
            strafe_ms,
            rot * self.params.max_angular_rate_rads
        );

        let demand = match (self.mode, input_data.target_heading_rad) {
            (DriveMode::RobotRelative, _) => DriveDemand::RobotRelative(velocity),
            (DriveMode::FieldRelativeHeading, Some(heading_rad)) if heading_rad.is_finite() =>
                DriveDemand::FieldRelativeHeading { fwd_ms, strafe_ms, heading_rad },
            _ => DriveDemand::FieldRelative(velocity),
        };

        trace!("InputShaper output: {:?}", demand);

        Ok((demand, report))
    }

    /// Leave the limiters at zero so no stale demand survives a handover.
    fn end(&mut self) {
        self.reset_limiters();
        info!("InputShaper ended");
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn robot_relative_shaper() -> InputShaper {
        let mut shaper = InputShaper::new(Params {
            drive_mode: DriveMode::RobotRelative,
            ..Params::default()
        });
        shaper.init(()).unwrap();
        shaper
    }

    fn input(x: f64, y: f64, rot: f64) -> InputData {
        InputData {
            axes: AxisSample { x, y, rot },
            target_heading_rad: None,
        }
    }

    fn velocity(demand: DriveDemand) -> ChassisVelocity {
        match demand {
            DriveDemand::RobotRelative(v) | DriveDemand::FieldRelative(v) => v,
            DriveDemand::FieldRelativeHeading { .. } => panic!("unexpected heading demand"),
        }
    }

    #[test]
    fn test_forward_rises_monotonically() {
        let mut shaper = robot_relative_shaper();
        let max = Params::default().max_linear_speed_ms;

        let mut prev = 0.0;
        for _ in 0..50 {
            let (demand, _) = shaper.proc(&input(0.0, 1.0, 0.0)).unwrap();
            let v = velocity(demand);

            assert!(v.fwd_ms >= prev);
            assert!(v.fwd_ms <= max);
            assert_eq!(v.strafe_ms, 0.0);
            assert_eq!(v.turn_rate_rads, 0.0);
            prev = v.fwd_ms;
        }

        assert_eq!(prev, max);
    }

    #[test]
    fn test_init_zeroes_limiters() {
        let mut shaper = robot_relative_shaper();
        for _ in 0..10 {
            shaper.proc(&input(0.8, -1.0, 0.5)).unwrap();
        }
        assert!(shaper.limiter_values() != (0.0, 0.0, 0.0));

        shaper.init(()).unwrap();
        assert_eq!(shaper.limiter_values(), (0.0, 0.0, 0.0));
        shaper.init(()).unwrap();
        assert_eq!(shaper.limiter_values(), (0.0, 0.0, 0.0));

        shaper.proc(&input(1.0, 1.0, 1.0)).unwrap();
        shaper.end();
        assert_eq!(shaper.limiter_values(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_deadband_applied() {
        let mut shaper = robot_relative_shaper();

        for _ in 0..20 {
            let (demand, _) = shaper.proc(&input(0.05, -0.069, 0.06)).unwrap();
            assert!(velocity(demand).is_zero());
        }
    }

    #[test]
    fn test_full_diagonal_is_max_speed() {
        let mut shaper = robot_relative_shaper();
        let max = Params::default().max_linear_speed_ms;

        let mut last = ChassisVelocity::default();
        let mut report = StatusReport::default();
        for _ in 0..50 {
            let (demand, r) = shaper.proc(&input(1.0, 1.0, 0.0)).unwrap();
            last = velocity(demand);
            report = r;
        }

        assert!(report.translation_clamped);
        assert!((last.fwd_ms.hypot(last.strafe_ms) - max).abs() < 1e-9);
        assert!((last.fwd_ms - last.strafe_ms).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_scaling_and_inversion() {
        let mut shaper = InputShaper::new(Params {
            drive_mode: DriveMode::RobotRelative,
            invert_rot: true,
            ..Params::default()
        });
        shaper.init(()).unwrap();

        let (demand, _) = shaper.proc(&input(0.0, 0.0, 1.0)).unwrap();
        let expected = -0.04 * 1920f64.to_radians();
        assert!((velocity(demand).turn_rate_rads - expected).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_axes() {
        let mut shaper = robot_relative_shaper();

        let (demand, report) = shaper.proc(&input(f64::NAN, f64::INFINITY, 0.0)).unwrap();
        assert!(report.non_finite_input);
        assert!(velocity(demand).is_zero());
    }

    #[test]
    fn test_modes() {
        let mut shaper = robot_relative_shaper();

        shaper.set_drive_mode(DriveMode::FieldRelative);
        let (demand, _) = shaper.proc(&input(0.0, 1.0, 0.0)).unwrap();
        assert!(matches!(demand, DriveDemand::FieldRelative(_)));

        shaper.set_drive_mode(DriveMode::FieldRelativeHeading);
        let (demand, _) = shaper.proc(&InputData {
            axes: AxisSample { x: 0.0, y: 1.0, rot: 0.0 },
            target_heading_rad: Some(1.0),
        }).unwrap();
        match demand {
            DriveDemand::FieldRelativeHeading { fwd_ms, strafe_ms, heading_rad } => {
                assert!((fwd_ms - 0.48).abs() < 1e-9);
                assert_eq!(strafe_ms, 0.0);
                assert_eq!(heading_rad, 1.0);
            },
            d => panic!("unexpected demand {:?}", d),
        }

        // No target heading falls back to a rate demand
        let (demand, _) = shaper.proc(&input(0.0, 1.0, 0.0)).unwrap();
        assert!(matches!(demand, DriveDemand::FieldRelative(_)));
    }

    #[test]
    fn test_invalid_params() {
        let mut shaper = InputShaper::new(Params {
            cycle_period_s: 0.0,
            ..Params::default()
        });

        assert!(matches!(
            shaper.init(()),
            Err(InputShaperError::InvalidParam("cycle_period_s", _))
        ));
    }
}
