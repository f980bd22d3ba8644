//! # Input shaping module
//!
//! Converts the raw joystick axes into a chassis velocity demand. Each cycle
//! the axes are passed through:
//!
//! 1. A deadband, suppressing stick drift around the centre,
//! 2. A slew rate limiter per axis,
//! 3. For the translation axes, a normalisation onto the unit disk so that a
//!    full diagonal deflection commands the maximum linear speed and not
//!    `sqrt(2)` times it,
//! 4. Scaling to physical units.
//!
//! The result is tagged with the frame it should be interpreted in, given by
//! the current [`DriveMode`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod filters;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::chassis_kin::ChassisVelocity;

pub use filters::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One sample of the three joystick axes, each nominally in [-1, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisSample {
    /// Sideways deflection, positive to the left.
    pub x: f64,

    /// Forward deflection, positive forwards.
    pub y: f64,

    /// Rotation deflection, positive counter-clockwise.
    pub rot: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The frame in which shaped commands are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveMode {
    /// Commands are in the chassis frame.
    RobotRelative,

    /// Commands are in the field frame and rotated into the chassis frame by
    /// the current heading.
    FieldRelative,

    /// Translation is in the field frame and the chassis holds an absolute
    /// heading rather than following a rotation rate.
    FieldRelativeHeading,
}

/// A shaped demand for the chassis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DriveDemand {
    RobotRelative(ChassisVelocity),

    FieldRelative(ChassisVelocity),

    FieldRelativeHeading {
        /// Units: meters/second
        fwd_ms: f64,

        /// Units: meters/second
        strafe_ms: f64,

        /// Target heading in the field.
        ///
        /// Units: radians
        heading_rad: f64,
    },
}

/// Possible errors that can occur during InputShaper operation.
#[derive(Debug, thiserror::Error)]
pub enum InputShaperError {
    #[error("Invalid input shaper parameter {0}: {1}")]
    InvalidParam(&'static str, f64),
}
