//! # Drive control module
//!
//! Chassis level control of the four swerve modules. A chassis velocity,
//! either in the chassis frame or in the field frame, is turned into four
//! wheel targets by the kinematics, desaturated, and handed to each module's
//! controller.
//!
//! Only one controlling entity may write to the actuators at a time. This is
//! enforced by a [`Lease`]: every operation which writes to the actuators
//! takes the lease, and a lease which has been released or revoked is
//! rejected.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod heading_hold;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use heading_hold::*;
pub use params::*;
pub use state::*;

use crate::heading_est::HeadingEstError;
use crate::module_ctrl::ModuleCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Exclusive right to write to the chassis actuators.
///
/// A lease cannot be cloned. It stops being valid when it is released or
/// revoked.
#[derive(Debug)]
pub struct Lease {
    generation: u64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("The actuators are already leased to another controller")]
    AlreadyLeased,

    #[error("The lease used is not the one currently held")]
    LeaseNotHeld,

    #[error("Invalid drive control parameter {0}: {1}")]
    InvalidParam(&'static str, f64),

    #[error("Module control error: {0}")]
    Module(#[from] ModuleCtrlError),

    #[error("Heading estimation error: {0}")]
    HeadingEst(#[from] HeadingEstError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Lease {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
