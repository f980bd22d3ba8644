//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::Serialize;

// Internal
use super::{DriveCtrlError, HeadingHold, Lease, PHeadingHold, Params};
use crate::chassis_kin::{
    desaturate,
    ChassisKinematics, ChassisVelocity, ModuleCommand, ModuleId, WheelState,
    NUM_MODULES
};
use crate::hal::{ModuleHw, RateGyro};
use crate::heading_est::{HeadingEstimator, RotationSample};
use crate::input_shaper::DriveDemand;
use crate::module_ctrl::{self, ModuleCtrl};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Chassis level drive controller.
pub struct DriveCtrl<H: ModuleHw, G: RateGyro> {
    params: Params,

    kinematics: ChassisKinematics,

    modules: [ModuleCtrl<H>; NUM_MODULES],

    gyro: G,
    heading_est: HeadingEstimator,
    heading_hold: Box<dyn HeadingHold>,

    /// Incremented every time a lease is issued or revoked.
    lease_generation: u64,
    lease_held: bool,

    report: StatusReport,
}

/// Status report for the last drive operation.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Wheel speeds were scaled down to the module speed limit.
    pub desaturated: bool,

    /// The chassis was commanded to stop and hold its steer angles.
    pub stopped: bool,

    /// Per module, the target was flipped by the optimisation.
    pub flipped: [bool; NUM_MODULES],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<H: ModuleHw, G: RateGyro> DriveCtrl<H, G> {

    /// Create a new drive controller from the hardware of each module, in
    /// `ModuleId` order, and the chassis gyro.
    ///
    /// Every module's steer encoder is synchronised to its absolute sensor.
    /// The heading starts at zero.
    pub fn new(
        hw: [H; NUM_MODULES],
        gyro: G,
        params: &Params,
        module_params: &module_ctrl::Params
    ) -> Result<Self, DriveCtrlError> {
        validate_params(params)?;

        let [fl, fr, bl, br] = hw;
        let offsets = &params.abs_offsets_rad;

        let modules = [
            ModuleCtrl::new(ModuleId::FL, fl, offsets[ModuleId::FL.index()], module_params)?,
            ModuleCtrl::new(ModuleId::FR, fr, offsets[ModuleId::FR.index()], module_params)?,
            ModuleCtrl::new(ModuleId::BL, bl, offsets[ModuleId::BL.index()], module_params)?,
            ModuleCtrl::new(ModuleId::BR, br, offsets[ModuleId::BR.index()], module_params)?,
        ];

        info!("DriveCtrl initialised");

        Ok(Self {
            params: params.clone(),
            kinematics: ChassisKinematics::new(params.geometry()),
            modules,
            gyro,
            heading_est: HeadingEstimator::new(params.cycle_period_s)?,
            heading_hold: Box::new(PHeadingHold::new(
                params.heading_hold_k_p,
                params.max_angular_rate_rads
            )),
            lease_generation: 0,
            lease_held: false,
            report: StatusReport::default(),
        })
    }

    /// Replace the controller used by `drive_field_relative_heading`.
    pub fn set_heading_hold(&mut self, heading_hold: Box<dyn HeadingHold>) {
        self.heading_hold = heading_hold;
    }

    pub fn module(&self, id: ModuleId) -> &ModuleCtrl<H> {
        &self.modules[id.index()]
    }

    pub fn module_mut(&mut self, id: ModuleId) -> &mut ModuleCtrl<H> {
        &mut self.modules[id.index()]
    }

    pub fn gyro(&self) -> &G {
        &self.gyro
    }

    pub fn kinematics(&self) -> &ChassisKinematics {
        &self.kinematics
    }

    pub fn report(&self) -> StatusReport {
        self.report
    }

    /// Current chassis heading in the field.
    ///
    /// Units: radians
    pub fn heading_rad(&self) -> f64 {
        self.heading_est.heading_rad()
    }

    /// Measured state of every module as of the last sample.
    pub fn current_states(&self) -> [WheelState; NUM_MODULES] {
        let mut states = [WheelState::default(); NUM_MODULES];
        for (s, m) in states.iter_mut().zip(self.modules.iter()) {
            *s = m.current_state();
        }
        states
    }

    // ---- LEASE ----

    /// Take exclusive control of the actuators.
    ///
    /// The new owner should `stop` before issuing any other demand.
    pub fn acquire(&mut self) -> Result<Lease, DriveCtrlError> {
        if self.lease_held {
            warn!("Drive lease requested while already held");
            return Err(DriveCtrlError::AlreadyLeased);
        }

        self.lease_generation += 1;
        self.lease_held = true;
        info!("Drive lease {} acquired", self.lease_generation);

        Ok(Lease { generation: self.lease_generation })
    }

    /// Give up control of the actuators, leaving them in neutral.
    pub fn release(&mut self, lease: Lease) -> Result<(), DriveCtrlError> {
        self.check_lease(&lease)?;

        self.set_neutral();
        self.lease_held = false;
        info!("Drive lease {} released", lease.generation);

        Ok(())
    }

    /// Invalidate any outstanding lease, leaving the actuators in neutral.
    pub fn revoke(&mut self) {
        if self.lease_held {
            warn!("Drive lease {} revoked", self.lease_generation);
            self.set_neutral();
        }

        self.lease_generation += 1;
        self.lease_held = false;
    }

    /// True if `lease` is the lease currently held.
    pub fn is_held(&self, lease: &Lease) -> bool {
        self.lease_held && lease.generation == self.lease_generation
    }

    fn check_lease(&self, lease: &Lease) -> Result<(), DriveCtrlError> {
        if self.is_held(lease) {
            Ok(())
        }
        else {
            warn!(
                "Stale drive lease {} used (current {}, held: {})",
                lease.generation, self.lease_generation, self.lease_held
            );
            Err(DriveCtrlError::LeaseNotHeld)
        }
    }

    // ---- CYCLIC ----

    /// Read all sensors for this cycle, updating the heading and every
    /// module's measured state. Returns the new heading.
    pub fn sample(&mut self) -> Result<f64, DriveCtrlError> {
        let rate_rads = self.gyro.rate_rads();
        let (heading_rad, _) = self.heading_est.proc(&RotationSample::Rate(rate_rads))?;

        for m in self.modules.iter_mut() {
            m.sample();
        }

        Ok(heading_rad)
    }

    /// Drive with a velocity in the chassis frame.
    ///
    /// A velocity which is exactly zero is executed as `stop`.
    pub fn drive(
        &mut self,
        lease: &Lease,
        velocity: &ChassisVelocity
    ) -> Result<[ModuleCommand; NUM_MODULES], DriveCtrlError> {
        self.check_lease(lease)?;

        let finite = velocity.fwd_ms.is_finite()
            && velocity.strafe_ms.is_finite()
            && velocity.turn_rate_rads.is_finite();
        if !finite {
            warn!("Non-finite chassis velocity {:?}, stopping", velocity);
        }

        if !finite || velocity.is_zero() {
            return Ok(self.hold_all());
        }

        let mut targets = self.kinematics.to_wheel_states(velocity);
        let desaturated = desaturate(&mut targets, self.params.max_module_speed_ms);

        let mut cmds = [ModuleCommand::zero(); NUM_MODULES];
        let mut flipped = [false; NUM_MODULES];

        for (i, m) in self.modules.iter_mut().enumerate() {
            cmds[i] = m.set_desired_state(&targets[i]);
            flipped[i] = m.report().flipped;
        }

        self.gyro.track_command(velocity);

        self.report = StatusReport {
            desaturated,
            stopped: false,
            flipped,
        };

        trace!("Drive {:?} -> {:?}", velocity, cmds);

        Ok(cmds)
    }

    /// Drive with a velocity in the field frame, rotated into the chassis
    /// frame by the current heading.
    pub fn drive_field_relative(
        &mut self,
        lease: &Lease,
        velocity: &ChassisVelocity
    ) -> Result<[ModuleCommand; NUM_MODULES], DriveCtrlError> {
        let chassis = ChassisVelocity::from_field_relative(*velocity, self.heading_rad());
        self.drive(lease, &chassis)
    }

    /// Drive with a translation in the field frame while turning to hold
    /// `heading_rad`.
    pub fn drive_field_relative_heading(
        &mut self,
        lease: &Lease,
        fwd_ms: f64,
        strafe_ms: f64,
        heading_rad: f64
    ) -> Result<[ModuleCommand; NUM_MODULES], DriveCtrlError> {
        self.check_lease(lease)?;

        let turn_rate_rads = self.heading_hold.rate_rads(self.heading_rad(), heading_rad);
        debug!(
            "Holding heading {:.3} rad from {:.3} rad: {:.3} rad/s",
            heading_rad, self.heading_rad(), turn_rate_rads
        );

        self.drive_field_relative(
            lease,
            &ChassisVelocity::new(fwd_ms, strafe_ms, turn_rate_rads)
        )
    }

    /// Execute a shaped demand.
    pub fn execute(
        &mut self,
        lease: &Lease,
        demand: &DriveDemand
    ) -> Result<[ModuleCommand; NUM_MODULES], DriveCtrlError> {
        match *demand {
            DriveDemand::RobotRelative(ref v) => self.drive(lease, v),
            DriveDemand::FieldRelative(ref v) => self.drive_field_relative(lease, v),
            DriveDemand::FieldRelativeHeading { fwd_ms, strafe_ms, heading_rad } =>
                self.drive_field_relative_heading(lease, fwd_ms, strafe_ms, heading_rad),
        }
    }

    /// Zero all drive speeds while holding every module's measured angle.
    pub fn stop(&mut self, lease: &Lease) -> Result<[ModuleCommand; NUM_MODULES], DriveCtrlError> {
        self.check_lease(lease)?;
        Ok(self.hold_all())
    }

    /// Remove all actuator demand.
    pub fn neutral(&mut self, lease: &Lease) -> Result<[ModuleCommand; NUM_MODULES], DriveCtrlError> {
        self.check_lease(lease)?;
        Ok(self.set_neutral())
    }

    /// Set the heading to a known value.
    pub fn reset_heading(&mut self, lease: &Lease, heading_rad: f64) -> Result<(), DriveCtrlError> {
        self.check_lease(lease)?;
        self.heading_est.reset(heading_rad)?;
        self.heading_hold.reset();
        Ok(())
    }

    /// Resynchronise every module's encoders.
    pub fn reset_encoders(&mut self, lease: &Lease) -> Result<(), DriveCtrlError> {
        self.check_lease(lease)?;
        for m in self.modules.iter_mut() {
            m.reset_encoders()?;
        }
        Ok(())
    }

    fn hold_all(&mut self) -> [ModuleCommand; NUM_MODULES] {
        let mut cmds = [ModuleCommand::zero(); NUM_MODULES];
        for (c, m) in cmds.iter_mut().zip(self.modules.iter_mut()) {
            *c = m.hold();
        }

        self.gyro.track_command(&ChassisVelocity::default());
        self.report = StatusReport {
            stopped: true,
            ..StatusReport::default()
        };

        trace!("Drive stopped, holding angles");

        cmds
    }

    fn set_neutral(&mut self) -> [ModuleCommand; NUM_MODULES] {
        for m in self.modules.iter_mut() {
            m.neutral();
        }

        self.gyro.track_command(&ChassisVelocity::default());
        self.report = StatusReport {
            stopped: true,
            ..StatusReport::default()
        };

        [ModuleCommand::zero(); NUM_MODULES]
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that the parameters can be used by the drive.
fn validate_params(p: &Params) -> Result<(), DriveCtrlError> {
    let checks = [
        ("cycle_period_s", p.cycle_period_s, p.cycle_period_s > 0.0),
        ("max_module_speed_ms", p.max_module_speed_ms, p.max_module_speed_ms > 0.0),
        ("max_angular_rate_rads", p.max_angular_rate_rads, p.max_angular_rate_rads > 0.0),
        ("heading_hold_k_p", p.heading_hold_k_p, p.heading_hold_k_p >= 0.0),
    ];

    for (name, value, ok) in checks.iter() {
        if !ok || !value.is_finite() {
            return Err(DriveCtrlError::InvalidParam(*name, *value));
        }
    }

    let positions_finite = p.module_pos_m
        .iter()
        .flat_map(|pos| pos.iter())
        .all(|v| v.is_finite());
    if !positions_finite {
        return Err(DriveCtrlError::InvalidParam("module_pos_m", f64::NAN));
    }

    if let Some(o) = p.abs_offsets_rad.iter().find(|o| !o.is_finite()) {
        return Err(DriveCtrlError::InvalidParam("abs_offsets_rad", *o));
    }

    Ok(())
}
