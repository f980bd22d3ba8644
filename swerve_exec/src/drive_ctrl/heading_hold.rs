//! Heading hold controllers

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::get_ang_dist;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Resolves a target heading into the rotation rate needed to reach it.
pub trait HeadingHold {
    /// Rotation rate to demand this cycle.
    ///
    /// Units: radians/second
    fn rate_rads(&mut self, heading_rad: f64, target_rad: f64) -> f64;

    /// Clear any internal state.
    fn reset(&mut self) {}
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Proportional heading hold, limited to a maximum rate.
#[derive(Clone, Debug)]
pub struct PHeadingHold {
    pub k_p: f64,

    /// Units: radians/second
    pub max_rate_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PHeadingHold {
    pub fn new(k_p: f64, max_rate_rads: f64) -> Self {
        Self { k_p, max_rate_rads }
    }
}

impl HeadingHold for PHeadingHold {
    fn rate_rads(&mut self, heading_rad: f64, target_rad: f64) -> f64 {
        let rate = self.k_p * get_ang_dist(heading_rad, target_rad);
        rate.max(-self.max_rate_rads).min(self.max_rate_rads)
    }
}
