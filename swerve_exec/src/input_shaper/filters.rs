//! Signal shaping functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Limits the rate of change of a signal sampled at a fixed period.
#[derive(Clone, Debug, Serialize)]
pub struct SlewRateLimiter {
    /// Largest change allowed in one period.
    max_step: f64,

    value: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SlewRateLimiter {

    /// Create a limiter which allows a change of at most `rate_per_s` units
    /// per second, called once every `period_s` seconds. The output starts at
    /// zero.
    pub fn new(rate_per_s: f64, period_s: f64) -> Self {
        Self {
            max_step: rate_per_s * period_s,
            value: 0.0,
        }
    }

    /// Move the output towards `input` by at most one step.
    pub fn calculate(&mut self, input: f64) -> f64 {
        let delta = input - self.value;

        if delta.abs() <= self.max_step {
            self.value = input;
        }
        else {
            self.value += self.max_step.copysign(delta);
        }

        self.value
    }

    /// The current output.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Force the output to `value`.
    pub fn reset(&mut self, value: f64) {
        self.value = value;
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Zero values whose magnitude is below `threshold`, pass others through
/// unchanged.
pub fn deadband(value: f64, threshold: f64) -> f64 {
    if value.abs() < threshold {
        0.0
    }
    else {
        value
    }
}

/// Map a translation demand from the unit square onto the unit disk, then
/// scale it to `max_speed`.
///
/// Inputs already inside the unit disk keep their magnitude. The direction is
/// always preserved. Returns the scaled components and whether the magnitude
/// was clamped.
pub fn normalise_translation(a: f64, b: f64, max_speed: f64) -> (f64, f64, bool) {
    let mag = a.hypot(b);

    let (scale, clamped) = if mag > 1.0 {
        (1.0 / mag, true)
    }
    else {
        (1.0, false)
    };

    (a * scale * max_speed, b * scale * max_speed, clamped)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_deadband() {
        assert_eq!(deadband(0.0, 0.07), 0.0);
        assert_eq!(deadband(0.069, 0.07), 0.0);
        assert_eq!(deadband(-0.069, 0.07), 0.0);
        assert_eq!(deadband(0.07, 0.07), 0.07);
        assert_eq!(deadband(-0.07, 0.07), -0.07);
        assert_eq!(deadband(0.5, 0.07), 0.5);
        assert_eq!(deadband(-1.0, 0.07), -1.0);
    }

    #[test]
    fn test_slew_rate_step() {
        let mut limiter = SlewRateLimiter::new(3.0, 0.02);

        let first = limiter.calculate(1.0);
        assert!(first <= 0.06 + 1e-12);
        assert!(first > 0.0);

        // ceil(1 / 0.06) = 17 cycles to reach the input
        let mut ticks = 1;
        while limiter.value() < 1.0 {
            limiter.calculate(1.0);
            ticks += 1;
            assert!(ticks <= 17);
        }
        assert_eq!(ticks, 17);
        assert_eq!(limiter.value(), 1.0);
    }

    #[test]
    fn test_slew_rate_falling() {
        let mut limiter = SlewRateLimiter::new(2.0, 0.02);
        limiter.reset(0.5);

        assert!((limiter.calculate(-1.0) - 0.46).abs() < 1e-12);
        assert!((limiter.calculate(0.45) - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_slew_rate_reset() {
        let mut limiter = SlewRateLimiter::new(3.0, 0.02);
        for _ in 0..10 {
            limiter.calculate(1.0);
        }

        limiter.reset(0.0);
        assert_eq!(limiter.value(), 0.0);
        limiter.reset(0.0);
        assert_eq!(limiter.value(), 0.0);
        assert!((limiter.calculate(1.0) - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_diagonal_normalisation() {
        let (a, b, clamped) = normalise_translation(1.0, 1.0, 4.0);

        assert!(clamped);
        assert!((a.hypot(b) - 4.0).abs() < 1e-12);
        assert!((b.atan2(a) - FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn test_normalisation_inside_disk() {
        let (a, b, clamped) = normalise_translation(0.3, -0.4, 4.0);

        assert!(!clamped);
        assert!((a - 1.2).abs() < 1e-12);
        assert!((b + 1.6).abs() < 1e-12);

        // Exact zeros stay zero
        let (a, b, _) = normalise_translation(1.0, 0.0, 4.0);
        assert_eq!(a, 4.0);
        assert_eq!(b, 0.0);
    }
}
