//! # Swerve module control
//!
//! Each of the four swerve modules is driven by its own [`ModuleCtrl`], a
//! dual loop controller:
//!
//! - The steer loop is a motion profiled position controller on the module
//!   angle. Angles wrap, so every error is the shortest signed distance
//!   around the circle.
//! - The drive loop is a proportional velocity controller plus a motor model
//!   feedforward. The measured speed is differentiated from the drive
//!   encoder position rather than read from the motor controller, whose
//!   velocity signal lags.
//!
//! Before either loop runs the target is optimised: if the module would have
//! to steer by more than a threshold, the equivalent target pointing the
//! other way with negated speed is used instead.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controllers;
mod optimise;
mod params;
mod profile;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use controllers::*;
pub use optimise::*;
pub use params::*;
pub use profile::{Constraints, ProfileState};
pub use state::*;

use crate::chassis_kin::ModuleId;
use crate::hal::HalError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ModuleCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ModuleCtrlError {
    #[error("Module hardware error: {0}")]
    Hal(#[from] HalError),

    #[error("Absolute angle sensor of module {0} returned an invalid value ({1})")]
    AbsSensorInvalid(ModuleId, f64),

    #[error("Invalid module control parameter {0}: {1}")]
    InvalidParam(&'static str, f64),
}
