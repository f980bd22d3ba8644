//! Trapezoidal motion profile
//!
//! Produces the next setpoint on a trapezoidal velocity profile from the
//! current setpoint to a goal, limited by a maximum velocity and
//! acceleration.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Limits of a trapezoidal profile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Maximum velocity, in position units/second
    pub max_vel: f64,

    /// Maximum acceleration, in position units/second^2
    pub max_accel: f64,
}

/// A point on a profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileState {
    pub pos: f64,
    pub vel: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate where the profile from `current` to `goal` will be after `t`
/// seconds.
///
/// Profiles running in the negative direction are computed by mirroring the
/// problem onto the positive direction and mirroring the result back.
pub fn calculate(
    constraints: &Constraints,
    current: ProfileState,
    goal: ProfileState,
    t: f64
) -> ProfileState {
    let direction = if current.pos > goal.pos { -1f64 } else { 1f64 };
    let mut current = direct(current, direction);
    let goal = direct(goal, direction);

    let max_vel = constraints.max_vel;
    let max_accel = constraints.max_accel;

    if current.vel > max_vel {
        current.vel = max_vel;
    }

    // Time and distance spent ramping up to the current velocity, and ramping
    // down from the goal velocity, as if both were part of a full trapezoid.
    let cutoff_begin = current.vel / max_accel;
    let cutoff_dist_begin = cutoff_begin * cutoff_begin * max_accel / 2.0;

    let cutoff_end = goal.vel / max_accel;
    let cutoff_dist_end = cutoff_end * cutoff_end * max_accel / 2.0;

    let full_trap_dist = cutoff_dist_begin + (goal.pos - current.pos) + cutoff_dist_end;
    let mut accel_time = max_vel / max_accel;

    let mut full_speed_dist = full_trap_dist - accel_time * accel_time * max_accel;

    // Triangular profile, max velocity is never reached
    if full_speed_dist < 0.0 {
        accel_time = (full_trap_dist / max_accel).sqrt();
        full_speed_dist = 0.0;
    }

    let end_accel = accel_time - cutoff_begin;
    let end_full_speed = end_accel + full_speed_dist / max_vel;
    let end_deccel = end_full_speed + accel_time - cutoff_end;

    let mut result = current;

    if t < end_accel {
        result.vel += t * max_accel;
        result.pos += (current.vel + t * max_accel / 2.0) * t;
    }
    else if t < end_full_speed {
        result.vel = max_vel;
        result.pos += (current.vel + end_accel * max_accel / 2.0) * end_accel
            + max_vel * (t - end_accel);
    }
    else if t <= end_deccel {
        let time_left = end_deccel - t;
        result.vel = goal.vel + time_left * max_accel;
        result.pos = goal.pos - (goal.vel + time_left * max_accel / 2.0) * time_left;
    }
    else {
        result = goal;
    }

    direct(result, direction)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn direct(state: ProfileState, direction: f64) -> ProfileState {
    ProfileState {
        pos: state.pos * direction,
        vel: state.vel * direction,
    }
}
