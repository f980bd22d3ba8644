//! Implementations for the HeadingEstimator state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::Serialize;

// Internal
use super::{HeadingEstError, RotationSample};
use util::{maths::wrap_pi, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Heading estimator state
#[derive(Clone, Debug)]
pub struct HeadingEstimator {
    /// Units: seconds
    period_s: f64,

    /// Units: radians, in (-pi, pi]
    heading_rad: f64,
}

/// Status report for heading estimation.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The sample was not finite and was not integrated.
    pub sample_rejected: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HeadingEstimator {
    /// Create a new estimator with a heading of zero, integrating samples
    /// taken every `period_s` seconds.
    pub fn new(period_s: f64) -> Result<Self, HeadingEstError> {
        if !period_s.is_finite() || period_s <= 0.0 {
            return Err(HeadingEstError::InvalidPeriod(period_s));
        }

        Ok(Self {
            period_s,
            heading_rad: 0.0
        })
    }

    /// Current heading.
    ///
    /// Units: radians, in (-pi, pi]
    pub fn heading_rad(&self) -> f64 {
        self.heading_rad
    }

    /// Set the heading to a known value.
    pub fn reset(&mut self, heading_rad: f64) -> Result<(), HeadingEstError> {
        if !heading_rad.is_finite() {
            return Err(HeadingEstError::InvalidHeading(heading_rad));
        }

        self.heading_rad = wrap_pi(heading_rad);
        info!("Heading reset to {:.4} rad", self.heading_rad);
        Ok(())
    }
}

impl State for HeadingEstimator {
    /// The initial heading.
    type InitData = f64;
    type InitError = HeadingEstError;

    type InputData = RotationSample;
    type OutputData = f64;
    type StatusReport = StatusReport;
    type ProcError = HeadingEstError;

    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.reset(init_data)
    }

    /// Integrate one rotation sample, returning the new heading.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();

        let delta_rad = match *input_data {
            RotationSample::Rate(rate_rads) => rate_rads * self.period_s,
            RotationSample::Delta(delta_rad) => delta_rad,
        };

        if delta_rad.is_finite() {
            self.heading_rad = wrap_pi(self.heading_rad + delta_rad);
        }
        else {
            warn!("Rotation sample {:?} rejected, heading held", input_data);
            report.sample_rejected = true;
        }

        trace!("Heading: {:.4} rad", self.heading_rad);

        Ok((self.heading_rad, report))
    }
}
