//! Steering travel optimisation and output shaping

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::PI;

use crate::chassis_kin::WheelState;
use util::maths::{get_ang_dist, sign};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Choose between the target and its equivalent pointing the opposite way
/// with negated speed, whichever needs less steering from `current_angle_rad`.
///
/// The target is flipped only if the shortest distance to it is strictly
/// greater than `threshold_rad`. Returns the chosen target and whether it was
/// flipped.
pub fn optimise(
    target: &WheelState,
    current_angle_rad: f64,
    threshold_rad: f64
) -> (WheelState, bool) {
    let dist_rad = get_ang_dist(current_angle_rad, target.angle_rad);

    if dist_rad.abs() > threshold_rad {
        (WheelState::new(-target.speed_ms, target.angle_rad + PI), true)
    }
    else {
        (*target, false)
    }
}

/// Add `bias` in the direction of `output` to overcome static friction.
///
/// An output of exactly zero is left at zero.
pub fn apply_static_bias(output: f64, bias: f64) -> f64 {
    output + sign(output) * bias
}
