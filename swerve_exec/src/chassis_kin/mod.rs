//! Chassis kinematics module
//!
//! Maps a chassis velocity onto the speed and angle each of the four wheels
//! must achieve. The map is fixed by the wheel geometry given at
//! construction and holds no other state.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod kinematics;
mod types;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use kinematics::*;
pub use types::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of swerve modules on the chassis.
pub const NUM_MODULES: usize = 4;
