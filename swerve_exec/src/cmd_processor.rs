//! # Command processor module
//!
//! The command processor handles operator commands coming from any source,
//! currently timed scripts.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use serde::{Deserialize, Serialize};

// Internal
use crate::{
    data_store::DataStore,
    hal::{ModuleHw, RateGyro},
    input_shaper::{AxisSample, DriveMode},
};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An operator command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Cmd {
    /// Give the joystick control of the drive.
    EnableTeleop,

    /// Take control away from the joystick, leaving the drive in neutral.
    DisableTeleop,

    /// New joystick axis values, held until the next `Axes` command.
    Axes {
        x: f64,
        y: f64,
        rot: f64,
    },

    /// Set the chassis heading to a known value.
    ResetHeading {
        heading_rad: f64
    },

    /// Change the frame joystick commands are interpreted in.
    SetDriveMode {
        mode: DriveMode
    },

    /// Set or clear the heading held in `DriveMode::FieldRelativeHeading`.
    TargetHeading {
        heading_rad: Option<f64>
    },
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a command.
///
/// Mutates the datastore to pass commands to the different modules.
pub fn exec<H: ModuleHw, G: RateGyro>(ds: &mut DataStore<H, G>, cmd: &Cmd) {

    debug!("Executing {:?}", cmd);

    match *cmd {
        Cmd::EnableTeleop => {
            if let Err(e) = ds.enable_teleop() {
                warn!("Could not enable teleop: {}", e);
            }
        },
        Cmd::DisableTeleop => {
            if let Err(e) = ds.disable_teleop() {
                warn!("Could not disable teleop: {}", e);
            }
        },
        Cmd::Axes { x, y, rot } => {
            ds.axes = AxisSample { x, y, rot };
        },
        Cmd::ResetHeading { heading_rad } => {
            ds.pending_heading_reset_rad = Some(heading_rad);
        },
        Cmd::SetDriveMode { mode } => {
            ds.input_shaper.set_drive_mode(mode);
        },
        Cmd::TargetHeading { heading_rad } => {
            ds.target_heading_rad = heading_rad;
        },
    }
}
