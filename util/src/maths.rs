//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::{Float, FloatConst};

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle into the range (-pi, pi].
///
/// Non-finite inputs are returned unchanged, callers are expected to reject
/// them before they reach any control loop.
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float + FloatConst
{
    let pi_t = T::PI();
    let tau_t = T::TAU();

    // [-pi, pi) first, then move the lower bound onto pi
    let mut wrapped = rem_euclid(angle + pi_t, tau_t) - pi_t;
    if wrapped <= -pi_t {
        wrapped = wrapped + tau_t;
    }
    if wrapped > pi_t {
        wrapped = wrapped - tau_t;
    }

    wrapped
}

/// Get the shortest signed angular distance to travel from `from` to `to`.
///
/// The result is in (-pi, pi], so that for example going from -179 degrees
/// to 179 degrees is a distance of -2 degrees rather than 358 degrees.
pub fn get_ang_dist<T>(from: T, to: T) -> T
where
    T: Float + FloatConst
{
    wrap_pi(to - from)
}

/// Return the sign of a value as -1, 0 or +1.
///
/// Unlike `Float::signum` zero maps onto zero.
pub fn sign<T>(value: T) -> T
where
    T: Float
{
    if value > T::zero() {
        T::one()
    }
    else if value < T::zero() {
        -T::one()
    }
    else {
        T::zero()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{PI, TAU};

    const EPS: f64 = 1e-12;

    #[test]
    fn test_wrap_pi() {
        assert!((wrap_pi(0f64)).abs() < EPS);
        assert!((wrap_pi(PI) - PI).abs() < EPS);
        assert!((wrap_pi(-PI) - PI).abs() < EPS);
        assert!((wrap_pi(3.0 * PI) - PI).abs() < EPS);
        assert!((wrap_pi(TAU + 1.0) - 1.0).abs() < EPS);
        assert!((wrap_pi(-TAU - 1.0) + 1.0).abs() < EPS);
        assert!((wrap_pi(1.5 * PI) + 0.5 * PI).abs() < EPS);
        assert!(wrap_pi(f64::NAN).is_nan());
    }

    #[test]
    fn test_get_ang_dist() {
        let d = get_ang_dist(-179f64.to_radians(), 179f64.to_radians());
        assert!((d.abs() - 2f64.to_radians()).abs() < EPS);

        let d = get_ang_dist(170f64.to_radians(), -170f64.to_radians());
        assert!((d - 20f64.to_radians()).abs() < EPS);

        let d = get_ang_dist(0f64, 170f64.to_radians());
        assert!((d - 170f64.to_radians()).abs() < EPS);

        assert!((get_ang_dist(1f64, 2f64) - 1f64).abs() < EPS);
        assert!((get_ang_dist(2f64, 1f64) + 1f64).abs() < EPS);
        assert!(get_ang_dist(0f64, TAU).abs() < EPS);
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(0f64), 0f64);
        assert_eq!(sign(-0f64), 0f64);
        assert_eq!(sign(0.3f64), 1f64);
        assert_eq!(sign(-12f64), -1f64);
    }
}
