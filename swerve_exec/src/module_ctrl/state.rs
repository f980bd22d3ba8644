//! Implementations for the ModuleCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use serde::Serialize;

// Internal
use super::{
    apply_static_bias, optimise,
    Constraints, Differentiator, ModuleCtrlError, Params,
    PidController, ProfiledPidController, SimpleMotorFeedforward
};
use crate::chassis_kin::{ModuleCommand, ModuleId, WheelState};
use crate::hal::{ModuleHw, MotorConfig};
use std::f64::consts::PI;
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Controller for a single swerve module.
pub struct ModuleCtrl<H: ModuleHw> {
    id: ModuleId,
    hw: H,

    params: Params,

    /// Calibration offset removed from the absolute sensor reading.
    ///
    /// Units: radians
    abs_offset_rad: f64,

    steer_ctrl: ProfiledPidController,
    drive_ctrl: PidController,
    drive_ff: SimpleMotorFeedforward,
    drive_diff: Differentiator,

    /// Time since construction, advanced once per sample.
    ///
    /// Units: seconds
    time_s: f64,

    /// Last accepted steer angle reading
    last_angle_rad: f64,

    /// Last accepted drive position reading
    last_drive_pos_m: f64,

    measured: WheelState,
    desired: WheelState,

    report: StatusReport,
}

/// Status report for ModuleCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The last target was replaced by its flipped equivalent.
    pub flipped: bool,

    /// The last steer angle reading was not finite and was ignored.
    pub angle_rejected: bool,

    /// The last drive position reading was not finite and was ignored.
    pub drive_pos_rejected: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<H: ModuleHw> ModuleCtrl<H> {

    /// Create a new module controller.
    ///
    /// The motors are configured and the relative steer encoder is
    /// synchronised to the absolute sensor, so the absolute sensor must give a
    /// valid reading at this point.
    pub fn new(
        id: ModuleId,
        mut hw: H,
        abs_offset_rad: f64,
        params: &Params
    ) -> Result<Self, ModuleCtrlError> {
        validate_params(params)?;

        if !abs_offset_rad.is_finite() {
            return Err(ModuleCtrlError::InvalidParam("abs_offset_rad", abs_offset_rad));
        }

        hw.configure(
            &MotorConfig::steer(params.steer_motor_revs_per_module_rev),
            &MotorConfig::drive(params.wheel_radius_m, params.drive_motor_revs_per_wheel_rev)
        )?;

        let mut steer_pid = PidController::new(
            params.steer_k_p, 0.0, params.steer_k_d, params.cycle_period_s
        );
        steer_pid.enable_continuous_angle();

        let mut ctrl = Self {
            id,
            hw,
            params: params.clone(),
            abs_offset_rad,
            steer_ctrl: ProfiledPidController::new(steer_pid, Constraints {
                max_vel: params.steer_max_vel_rads,
                max_accel: params.steer_max_accel_radss,
            }),
            drive_ctrl: PidController::new(params.drive_k_p, 0.0, 0.0, params.cycle_period_s),
            drive_ff: SimpleMotorFeedforward::new(
                params.drive_ff_k_s,
                params.drive_ff_k_v,
                params.drive_ff_k_a
            ),
            drive_diff: Differentiator::default(),
            time_s: 0.0,
            last_angle_rad: 0.0,
            last_drive_pos_m: 0.0,
            measured: WheelState::default(),
            desired: WheelState::default(),
            report: StatusReport::default(),
        };

        ctrl.reset_encoders()?;

        debug!(
            "Module {} initialised at {:.4} rad",
            ctrl.id, ctrl.last_angle_rad
        );

        Ok(ctrl)
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// The hardware this controller drives.
    pub fn hw(&self) -> &H {
        &self.hw
    }

    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn report(&self) -> StatusReport {
        self.report
    }

    /// Raw absolute sensor reading, before the calibration offset is removed.
    ///
    /// Units: radians, in [0, 2pi)
    pub fn raw_abs_angle_rad(&mut self) -> f64 {
        self.hw.abs_angle_rad()
    }

    /// Absolute module angle with the calibration offset removed.
    ///
    /// Units: radians, in (-pi, pi]
    pub fn abs_angle_rad(&mut self) -> f64 {
        wrap_pi(self.raw_abs_angle_rad() - self.abs_offset_rad)
    }

    /// Synchronise the relative steer encoder to the absolute angle.
    pub fn init_rotation_offset(&mut self) -> Result<(), ModuleCtrlError> {
        let abs_rad = self.abs_angle_rad();

        if !abs_rad.is_finite() {
            warn!("Module {} absolute sensor reading invalid: {}", self.id, abs_rad);
            return Err(ModuleCtrlError::AbsSensorInvalid(self.id, abs_rad));
        }

        self.hw.set_steer_pos_rad(abs_rad);
        self.last_angle_rad = abs_rad;
        self.measured.angle_rad = abs_rad;
        self.steer_ctrl.reset(abs_rad);

        Ok(())
    }

    /// Zero the driven distance.
    pub fn reset_distance(&mut self) {
        self.hw.set_drive_pos_m(0.0);
        self.hw.set_drive_vel_ms(0.0);
        self.last_drive_pos_m = 0.0;
        self.drive_diff.reset();
        self.drive_ctrl.reset();
        self.measured.speed_ms = 0.0;
    }

    /// Resynchronise the steer encoder and zero the driven distance.
    pub fn reset_encoders(&mut self) -> Result<(), ModuleCtrlError> {
        self.reset_distance();
        self.init_rotation_offset()
    }

    /// Distance driven since the last reset, as of the last sample.
    ///
    /// Units: meters
    pub fn drive_distance_m(&self) -> f64 {
        self.last_drive_pos_m
    }

    /// Measured state as of the last sample.
    pub fn current_state(&self) -> WheelState {
        self.measured
    }

    /// The last target after optimisation.
    pub fn desired_state(&self) -> WheelState {
        self.desired
    }

    /// Read the sensors for this cycle.
    ///
    /// Must be called once per cycle before `set_desired_state`. Non-finite
    /// readings are ignored and the last good value is held.
    pub fn sample(&mut self) -> WheelState {
        self.time_s += self.params.cycle_period_s;
        self.report = StatusReport::default();

        let angle_rad = self.hw.steer_pos_rad();
        if angle_rad.is_finite() {
            self.last_angle_rad = wrap_pi(angle_rad);
        }
        else {
            warn!("Module {} steer reading rejected: {}", self.id, angle_rad);
            self.report.angle_rejected = true;
        }

        let drive_pos_m = self.hw.drive_pos_m();
        let speed_ms = if drive_pos_m.is_finite() {
            self.last_drive_pos_m = drive_pos_m;
            self.drive_diff.update(drive_pos_m, self.time_s)
        }
        else {
            warn!("Module {} drive reading rejected: {}", self.id, drive_pos_m);
            self.report.drive_pos_rejected = true;
            self.drive_diff.rate()
        };

        self.measured = WheelState::new(speed_ms, self.last_angle_rad);
        self.measured
    }

    /// Drive the module towards `target` and write the actuator demands.
    pub fn set_desired_state(&mut self, target: &WheelState) -> ModuleCommand {
        let mut target = *target;
        if !target.speed_ms.is_finite() || !target.angle_rad.is_finite() {
            warn!(
                "Module {} given non-finite target {:?}, holding angle",
                self.id, target
            );
            target = WheelState::new(0.0, self.measured.angle_rad);
        }

        let (target, flipped) = optimise(
            &target,
            self.measured.angle_rad,
            self.params.optimise_threshold_rad
        );
        if flipped {
            debug!(
                "Module {} target flipped to {:.3} m/s at {:.3} rad",
                self.id, target.speed_ms, target.angle_rad
            );
        }
        self.report.flipped = flipped;

        let steer_out = self.steer_ctrl.calculate(
            self.measured.angle_rad,
            target.angle_rad
        );
        let steer_volts = apply_static_bias(steer_out, self.params.steer_static_bias_volts);

        let drive_volts = self.drive_ctrl.calculate(self.measured.speed_ms, target.speed_ms)
            + self.drive_ff.calculate(target.speed_ms, 0.0);

        self.hw.set_steer_volts(steer_volts);
        self.hw.set_drive_volts(drive_volts);
        self.hw.track_target(&target);

        self.desired = target;

        trace!(
            "Module {}: target ({:.3} m/s, {:.3} rad), steer {:.3} V, drive {:.3} V",
            self.id, target.speed_ms, target.angle_rad, steer_volts, drive_volts
        );

        ModuleCommand { steer_volts, drive_volts }
    }

    /// Hold the measured angle with zero drive speed.
    pub fn hold(&mut self) -> ModuleCommand {
        let target = WheelState::new(0.0, self.measured.angle_rad);
        self.set_desired_state(&target)
    }

    /// Remove all actuator demand without running the control loops.
    pub fn neutral(&mut self) -> ModuleCommand {
        self.hw.set_steer_volts(0.0);
        self.hw.set_drive_volts(0.0);
        self.steer_ctrl.reset(self.measured.angle_rad);
        self.drive_ctrl.reset();
        self.desired = WheelState::new(0.0, self.measured.angle_rad);

        ModuleCommand::zero()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that the parameters can be used by the control loops.
fn validate_params(p: &Params) -> Result<(), ModuleCtrlError> {
    let checks = [
        ("cycle_period_s", p.cycle_period_s, p.cycle_period_s > 0.0),
        ("steer_k_p", p.steer_k_p, true),
        ("steer_k_d", p.steer_k_d, true),
        ("steer_max_vel_rads", p.steer_max_vel_rads, p.steer_max_vel_rads > 0.0),
        ("steer_max_accel_radss", p.steer_max_accel_radss, p.steer_max_accel_radss > 0.0),
        ("steer_static_bias_volts", p.steer_static_bias_volts, p.steer_static_bias_volts >= 0.0),
        ("drive_k_p", p.drive_k_p, true),
        ("drive_ff_k_s", p.drive_ff_k_s, true),
        ("drive_ff_k_v", p.drive_ff_k_v, true),
        ("drive_ff_k_a", p.drive_ff_k_a, true),
        (
            "optimise_threshold_rad",
            p.optimise_threshold_rad,
            p.optimise_threshold_rad > 0.0 && p.optimise_threshold_rad <= PI
        ),
        ("wheel_radius_m", p.wheel_radius_m, p.wheel_radius_m > 0.0),
        (
            "drive_motor_revs_per_wheel_rev",
            p.drive_motor_revs_per_wheel_rev,
            p.drive_motor_revs_per_wheel_rev > 0.0
        ),
        (
            "steer_motor_revs_per_module_rev",
            p.steer_motor_revs_per_module_rev,
            p.steer_motor_revs_per_module_rev > 0.0
        ),
    ];

    for (name, value, ok) in checks.iter() {
        if !ok || !value.is_finite() {
            return Err(ModuleCtrlError::InvalidParam(*name, *value));
        }
    }

    Ok(())
}
