//! Swerve inverse kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector2;

// Internal
use super::{ChassisVelocity, WheelGeometry, WheelState, NUM_MODULES};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Inverse kinematics of a four module swerve chassis.
#[derive(Clone, Debug)]
pub struct ChassisKinematics {
    geometry: [WheelGeometry; NUM_MODULES],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisKinematics {
    /// Build the kinematics from the geometry of each module. The geometry is
    /// fixed for the lifetime of the instance.
    pub fn new(geometry: [WheelGeometry; NUM_MODULES]) -> Self {
        Self { geometry }
    }

    /// The geometry this map was built with.
    pub fn geometry(&self) -> &[WheelGeometry; NUM_MODULES] {
        &self.geometry
    }

    /// Compute the target state of every wheel for the given chassis frame
    /// velocity.
    ///
    /// Each wheel must move with the chassis translation plus the tangential
    /// velocity the rotation induces at that wheel's offset, `w x r`, which in
    /// 2D is the offset rotated by 90 degrees and scaled by `w`.
    pub fn to_wheel_states(&self, velocity: &ChassisVelocity) -> [WheelState; NUM_MODULES] {
        let translation = velocity.translation();
        let w = velocity.turn_rate_rads;

        let mut states = [WheelState::default(); NUM_MODULES];

        for (state, geom) in states.iter_mut().zip(self.geometry.iter()) {
            let r = geom.offset();
            let wheel_vel: Vector2<f64> = translation + Vector2::new(-w * r.y, w * r.x);

            *state = WheelState::new(
                wheel_vel.norm(),
                wheel_vel.y.atan2(wheel_vel.x)
            );
        }

        states
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Scale all wheel speeds down by a common factor so that none exceeds
/// `max_speed_ms`, preserving the ratio between wheels.
///
/// Returns true if the speeds were scaled.
pub fn desaturate(states: &mut [WheelState; NUM_MODULES], max_speed_ms: f64) -> bool {
    let highest = states
        .iter()
        .map(|s| s.speed_ms.abs())
        .fold(0f64, f64::max);

    if highest <= max_speed_ms || highest == 0.0 {
        return false;
    }

    let scale = max_speed_ms / highest;
    debug!(
        "Desaturating wheel speeds: highest {:.3} m/s, scale {:.3}",
        highest, scale
    );

    for s in states.iter_mut() {
        s.speed_ms *= scale;
    }

    true
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::chassis_kin::ModuleId;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    const HW: f64 = 0.3175;
    const EPS: f64 = 1e-9;

    fn square_kinematics() -> ChassisKinematics {
        ChassisKinematics::new([
            WheelGeometry::new(ModuleId::FL, HW, HW),
            WheelGeometry::new(ModuleId::FR, HW, -HW),
            WheelGeometry::new(ModuleId::BL, -HW, HW),
            WheelGeometry::new(ModuleId::BR, -HW, -HW),
        ])
    }

    #[test]
    fn test_pure_translation() {
        let kin = square_kinematics();
        let states = kin.to_wheel_states(&ChassisVelocity::new(1.0, 0.0, 0.0));

        for s in states.iter() {
            assert!((s.speed_ms - 1.0).abs() < EPS);
            assert!(s.angle_rad.abs() < EPS);
        }

        // Pure strafe points every wheel to the left
        let states = kin.to_wheel_states(&ChassisVelocity::new(0.0, 2.0, 0.0));
        for s in states.iter() {
            assert!((s.speed_ms - 2.0).abs() < EPS);
            assert!((s.angle_rad - FRAC_PI_2).abs() < EPS);
        }
    }

    #[test]
    fn test_pure_rotation() {
        let kin = square_kinematics();
        let w = 2.0;
        let states = kin.to_wheel_states(&ChassisVelocity::new(0.0, 0.0, w));

        for (s, g) in states.iter().zip(kin.geometry().iter()) {
            let r = g.offset();

            // Speed is w * |r|
            assert!((s.speed_ms - w * r.norm()).abs() < EPS);

            // Direction is perpendicular to the offset
            let dir = Vector2::new(s.angle_rad.cos(), s.angle_rad.sin());
            assert!(dir.dot(&r).abs() < EPS);
        }

        // Counter-clockwise rotation drives the front left wheel backwards
        // and to the left
        assert!((states[ModuleId::FL.index()].angle_rad - 3.0 * FRAC_PI_4).abs() < EPS);
        assert!((states[ModuleId::BR.index()].angle_rad + FRAC_PI_4).abs() < EPS);
    }

    #[test]
    fn test_translation_and_rotation() {
        let kin = square_kinematics();
        let states = kin.to_wheel_states(&ChassisVelocity::new(1.0, 0.0, 1.0));

        // FL: (1 - HW, HW), BR: (1 + HW, -HW)
        let fl = states[ModuleId::FL.index()];
        assert!((fl.speed_ms - (1.0 - HW).hypot(HW)).abs() < EPS);
        assert!((fl.angle_rad - HW.atan2(1.0 - HW)).abs() < EPS);

        let br = states[ModuleId::BR.index()];
        assert!((br.speed_ms - (1.0 + HW).hypot(HW)).abs() < EPS);
        assert!((br.angle_rad - (-HW).atan2(1.0 + HW)).abs() < EPS);
    }

    #[test]
    fn test_zero_velocity() {
        let kin = square_kinematics();
        let states = kin.to_wheel_states(&ChassisVelocity::default());

        for s in states.iter() {
            assert_eq!(s.speed_ms, 0.0);
            assert!(s.angle_rad.abs() < EPS || (s.angle_rad - PI).abs() < EPS);
        }
    }

    #[test]
    fn test_desaturate() {
        let mut states = [
            WheelState::new(2.0, 0.0),
            WheelState::new(-8.0, 1.0),
            WheelState::new(4.0, 2.0),
            WheelState::new(1.0, -1.0),
        ];

        assert!(desaturate(&mut states, 4.0));

        assert!((states[0].speed_ms - 1.0).abs() < EPS);
        assert!((states[1].speed_ms + 4.0).abs() < EPS);
        assert!((states[2].speed_ms - 2.0).abs() < EPS);
        assert!((states[3].speed_ms - 0.5).abs() < EPS);

        // Angles are untouched
        assert!((states[1].angle_rad - 1.0).abs() < EPS);

        // Already within limits
        assert!(!desaturate(&mut states, 4.0));
        assert!((states[1].speed_ms + 4.0).abs() < EPS);
    }
}
