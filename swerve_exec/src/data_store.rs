//! # Data Store
//!
//! Holds everything the executable carries from one cycle to the next, and
//! sequences the control modules within a cycle:
//!
//! 1. `cycle_start`
//! 2. `sample`, reading every sensor once
//! 3. Operator command processing (see `cmd_processor`)
//! 4. `control`, writing every actuator once
//! 5. `cycle_end`

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};

use crate::{
    chassis_kin::{ModuleCommand, NUM_MODULES},
    drive_ctrl::{self, DriveCtrl, DriveCtrlError, Lease},
    hal::{ModuleHw, RateGyro},
    input_shaper::{self, AxisSample, DriveDemand, InputShaper, InputShaperError},
};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore<H: ModuleHw, G: RateGyro> {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Time since the first cycle, counted in cycle periods.
    pub cycle_time_s: f64,

    // Operator input
    /// Last joystick axes received, held until new ones arrive.
    pub axes: AxisSample,

    /// Heading to hold in `DriveMode::FieldRelativeHeading`.
    pub target_heading_rad: Option<f64>,

    /// Heading reset requested by the operator, applied in `control`.
    pub pending_heading_reset_rad: Option<f64>,

    // InputShaper
    pub input_shaper: InputShaper,
    pub input_shaper_output: Option<DriveDemand>,
    pub input_shaper_status_rpt: input_shaper::StatusReport,

    // DriveCtrl
    pub drive_ctrl: DriveCtrl<H, G>,
    pub drive_ctrl_output: [ModuleCommand; NUM_MODULES],
    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,
    pub heading_rad: f64,

    /// Lease held while teleoperation is enabled.
    drive_lease: Option<Lease>,

    /// The next `control` must issue a stop rather than follow the shaper.
    takeover_pending: bool,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised while running teleoperation.
#[derive(Debug, thiserror::Error)]
pub enum TeleopError {
    #[error("InputShaper error: {0}")]
    InputShaper(#[from] InputShaperError),

    #[error("DriveCtrl error: {0}")]
    DriveCtrl(#[from] DriveCtrlError),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl<H: ModuleHw, G: RateGyro> DataStore<H, G> {
    pub fn new(input_shaper: InputShaper, drive_ctrl: DriveCtrl<H, G>) -> Self {
        Self {
            num_cycles: 0,
            is_1_hz_cycle: false,
            cycle_time_s: 0.0,
            axes: AxisSample::default(),
            target_heading_rad: None,
            pending_heading_reset_rad: None,
            input_shaper,
            input_shaper_output: None,
            input_shaper_status_rpt: input_shaper::StatusReport::default(),
            drive_ctrl,
            drive_ctrl_output: [ModuleCommand::zero(); NUM_MODULES],
            drive_ctrl_status_rpt: drive_ctrl::StatusReport::default(),
            heading_rad: 0.0,
            drive_lease: None,
            takeover_pending: false,
            num_consec_cycle_overruns: 0,
        }
    }

    /// True while teleoperation holds the drive lease.
    pub fn is_teleop_enabled(&self) -> bool {
        self.drive_lease.is_some()
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets
    /// the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_period_s: f64) {
        let cycles_per_s = (1.0 / cycle_period_s).round().max(1.0) as u128;
        self.is_1_hz_cycle = self.num_cycles % cycles_per_s == 0;

        self.cycle_time_s = self.num_cycles as f64 * cycle_period_s;

        self.input_shaper_output = None;
        self.input_shaper_status_rpt = input_shaper::StatusReport::default();
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }

    /// Read all sensors.
    pub fn sample(&mut self) -> Result<(), TeleopError> {
        self.heading_rad = self.drive_ctrl.sample()?;
        Ok(())
    }

    /// Give teleoperation control of the drive.
    ///
    /// The shaper is reinitialised, and the first `control` after this will
    /// stop the chassis before any operator demand is followed.
    pub fn enable_teleop(&mut self) -> Result<(), TeleopError> {
        if self.drive_lease.is_some() {
            return Ok(());
        }

        self.input_shaper.init(())?;
        self.drive_lease = Some(self.drive_ctrl.acquire()?);
        self.takeover_pending = true;

        info!("Teleop enabled");
        Ok(())
    }

    /// Take control away from teleoperation, leaving the drive in neutral.
    pub fn disable_teleop(&mut self) -> Result<(), TeleopError> {
        if let Some(lease) = self.drive_lease.take() {
            self.input_shaper.end();
            self.drive_ctrl.release(lease)?;
            self.drive_ctrl_output = [ModuleCommand::zero(); NUM_MODULES];
            self.takeover_pending = false;

            info!("Teleop disabled");
        }

        Ok(())
    }

    /// Run the control modules and write every actuator.
    ///
    /// If the drive lease has been revoked teleop is disabled, the shaper is
    /// ended and the error is returned for this cycle only.
    pub fn control(&mut self) -> Result<(), TeleopError> {
        let res = self.run_control();

        if let Err(TeleopError::DriveCtrl(DriveCtrlError::LeaseNotHeld)) = res {
            self.drive_lease = None;
            self.takeover_pending = false;
            self.input_shaper.end();
            self.input_shaper_output = None;

            info!("Drive lease revoked, teleop disabled");
        }

        res
    }

    fn run_control(&mut self) -> Result<(), TeleopError> {
        let lease = match self.drive_lease {
            Some(ref l) => l,
            None => {
                if let Some(h) = self.pending_heading_reset_rad.take() {
                    warn!("Heading reset to {:.3} rad ignored, teleop is not enabled", h);
                }
                return Ok(())
            }
        };

        if let Some(h) = self.pending_heading_reset_rad.take() {
            self.drive_ctrl.reset_heading(lease, h)?;
            self.heading_rad = self.drive_ctrl.heading_rad();
        }

        if self.takeover_pending {
            self.drive_ctrl_output = self.drive_ctrl.stop(lease)?;
            self.takeover_pending = false;
        }
        else {
            let (demand, rpt) = self.input_shaper.proc(&input_shaper::InputData {
                axes: self.axes,
                target_heading_rad: self.target_heading_rad,
            })?;
            self.input_shaper_output = Some(demand);
            self.input_shaper_status_rpt = rpt;

            self.drive_ctrl_output = self.drive_ctrl.execute(lease, &demand)?;
        }

        self.drive_ctrl_status_rpt = self.drive_ctrl.report();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hal::{IdealGyro, IdealModuleHw};
    use crate::module_ctrl;

    fn ideal_data_store() -> DataStore<IdealModuleHw, IdealGyro> {
        let params = drive_ctrl::Params::default();
        let o = params.abs_offsets_rad;
        let hw = [
            IdealModuleHw::new(0.02, o[0]),
            IdealModuleHw::new(0.02, o[1]),
            IdealModuleHw::new(0.02, o[2]),
            IdealModuleHw::new(0.02, o[3]),
        ];

        let drive = DriveCtrl::new(
            hw,
            IdealGyro::default(),
            &params,
            &module_ctrl::Params::default()
        ).unwrap();

        DataStore::new(InputShaper::new(input_shaper::Params::default()), drive)
    }

    fn cycle(ds: &mut DataStore<IdealModuleHw, IdealGyro>) {
        ds.cycle_start(0.02);
        ds.sample().unwrap();
        ds.control().unwrap();
        ds.cycle_end();
    }

    #[test]
    fn test_takeover_stops_first() {
        let mut ds = ideal_data_store();
        ds.axes = AxisSample { x: 0.0, y: 1.0, rot: 0.0 };

        // Nothing is driven until teleop is enabled
        cycle(&mut ds);
        assert!(ds.input_shaper_output.is_none());

        ds.enable_teleop().unwrap();
        assert!(ds.is_teleop_enabled());
        cycle(&mut ds);
        assert!(ds.drive_ctrl_status_rpt.stopped);
        assert!(ds.input_shaper_output.is_none());

        cycle(&mut ds);
        assert!(!ds.drive_ctrl_status_rpt.stopped);
        assert!(ds.input_shaper_output.is_some());
    }

    #[test]
    fn test_disable_teleop() {
        let mut ds = ideal_data_store();
        ds.axes = AxisSample { x: 0.5, y: 1.0, rot: 0.2 };
        ds.enable_teleop().unwrap();
        for _ in 0..5 {
            cycle(&mut ds);
        }

        ds.disable_teleop().unwrap();
        assert!(!ds.is_teleop_enabled());
        assert_eq!(ds.input_shaper.limiter_values(), (0.0, 0.0, 0.0));

        // Re-enabling is allowed
        ds.enable_teleop().unwrap();
        ds.enable_teleop().unwrap();
        assert!(ds.is_teleop_enabled());
    }

    #[test]
    fn test_cycle_time() {
        let mut ds = ideal_data_store();
        for _ in 0..50 {
            cycle(&mut ds);
        }

        ds.cycle_start(0.02);
        assert!((ds.cycle_time_s - 1.0).abs() < 1e-9);
        assert!(ds.is_1_hz_cycle);
    }

    #[test]
    fn test_revoked_lease_disables_teleop() {
        let mut ds = ideal_data_store();
        ds.axes = AxisSample { x: 0.3, y: 1.0, rot: 0.5 };
        ds.enable_teleop().unwrap();
        for _ in 0..5 {
            cycle(&mut ds);
        }
        assert!(ds.input_shaper.limiter_values().1 > 0.0);

        ds.drive_ctrl.revoke();

        ds.cycle_start(0.02);
        ds.sample().unwrap();
        assert!(matches!(
            ds.control(),
            Err(TeleopError::DriveCtrl(DriveCtrlError::LeaseNotHeld))
        ));
        assert!(!ds.is_teleop_enabled());
        assert!(ds.input_shaper_output.is_none());
        assert_eq!(ds.input_shaper.limiter_values(), (0.0, 0.0, 0.0));
        ds.cycle_end();

        // Later cycles are quiet until teleop is enabled again
        cycle(&mut ds);
        ds.disable_teleop().unwrap();

        ds.enable_teleop().unwrap();
        assert!(ds.is_teleop_enabled());
    }

    #[test]
    fn test_heading_reset() {
        let mut ds = ideal_data_store();

        ds.pending_heading_reset_rad = Some(1.0);
        cycle(&mut ds);
        assert!(ds.pending_heading_reset_rad.is_none());
        assert_eq!(ds.heading_rad, 0.0);

        ds.enable_teleop().unwrap();
        ds.pending_heading_reset_rad = Some(1.0);
        cycle(&mut ds);
        assert!((ds.heading_rad - 1.0).abs() < 1e-9);
    }
}
