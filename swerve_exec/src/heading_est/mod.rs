//! # Heading estimation module
//!
//! Tracks the absolute heading of the chassis in the field by integrating the
//! gyro rate each cycle. The heading is only used to rotate field relative
//! commands into the chassis frame.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A measurement of chassis rotation for one cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotationSample {
    /// Rotation rate over the cycle.
    ///
    /// Units: radians/second
    Rate(f64),

    /// Rotation since the previous cycle, from a sensor which integrates
    /// internally.
    ///
    /// Units: radians
    Delta(f64),
}

/// Possible errors that can occur during HeadingEstimator operation.
#[derive(Debug, thiserror::Error)]
pub enum HeadingEstError {
    #[error("Cycle period must be positive and finite, got {0}")]
    InvalidPeriod(f64),

    #[error("Cannot reset the heading to a non-finite value ({0})")]
    InvalidHeading(f64),
}
