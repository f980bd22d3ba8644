//! Data types shared by the chassis level and module level controllers

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

// Internal
use super::NUM_MODULES;
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A velocity demand for the whole chassis.
///
/// Whether the translation is in the chassis frame or the field frame
/// depends on where the value came from, it is not stored here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChassisVelocity {
    /// Forward velocity (chassis/field X+).
    ///
    /// Units: meters/second
    pub fwd_ms: f64,

    /// Strafe velocity (chassis/field Y+, to the left).
    ///
    /// Units: meters/second
    pub strafe_ms: f64,

    /// Rotation rate, positive counter-clockwise about Z+.
    ///
    /// Units: radians/second
    pub turn_rate_rads: f64,
}

/// The state of a single wheel, either a target or a measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelState {
    /// Signed linear speed of the wheel over the ground.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Direction the wheel points, 0 being chassis forward.
    ///
    /// Units: radians, in (-pi, pi]
    pub angle_rad: f64,
}

/// Fixed geometry of one swerve module.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WheelGeometry {
    /// Which module this is
    pub id: ModuleId,

    /// Position of the steer axis relative to the chassis centre of rotation.
    ///
    /// Units: meters,
    /// Frame: Chassis
    pub offset_m: [f64; 2],
}

/// Command sent to the actuators of one module.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ModuleCommand {
    /// Steer motor demand.
    ///
    /// Units: volts
    pub steer_volts: f64,

    /// Drive motor demand.
    ///
    /// Units: volts
    pub drive_volts: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Identifies one of the four modules. The discriminant is the index of the
/// module in every per-module array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModuleId {
    /// Front left
    FL = 0,
    /// Front right
    FR = 1,
    /// Back left
    BL = 2,
    /// Back right
    BR = 3,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisVelocity {
    pub fn new(fwd_ms: f64, strafe_ms: f64, turn_rate_rads: f64) -> Self {
        Self {
            fwd_ms,
            strafe_ms,
            turn_rate_rads,
        }
    }

    /// True if every component is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.fwd_ms == 0.0 && self.strafe_ms == 0.0 && self.turn_rate_rads == 0.0
    }

    /// The translational part of the velocity as a vector.
    pub fn translation(&self) -> Vector2<f64> {
        Vector2::new(self.fwd_ms, self.strafe_ms)
    }

    /// Convert a field relative velocity into the chassis frame, given the
    /// chassis heading in the field.
    pub fn from_field_relative(field: ChassisVelocity, heading_rad: f64) -> Self {
        let chassis = Rotation2::new(-heading_rad) * field.translation();

        Self {
            fwd_ms: chassis.x,
            strafe_ms: chassis.y,
            turn_rate_rads: field.turn_rate_rads,
        }
    }
}

impl WheelState {
    /// Create a new wheel state, wrapping the angle into (-pi, pi].
    pub fn new(speed_ms: f64, angle_rad: f64) -> Self {
        Self {
            speed_ms,
            angle_rad: wrap_pi(angle_rad),
        }
    }
}

impl WheelGeometry {
    pub fn new(id: ModuleId, x_m: f64, y_m: f64) -> Self {
        Self {
            id,
            offset_m: [x_m, y_m],
        }
    }

    /// The offset as a vector.
    pub fn offset(&self) -> Vector2<f64> {
        Vector2::new(self.offset_m[0], self.offset_m[1])
    }
}

impl ModuleCommand {
    /// A command with both actuators at zero.
    pub fn zero() -> Self {
        Self::default()
    }
}

impl ModuleId {
    /// All module IDs in array order.
    pub const ALL: [ModuleId; NUM_MODULES] = [
        ModuleId::FL,
        ModuleId::FR,
        ModuleId::BL,
        ModuleId::BR,
    ];

    /// Index of this module in per-module arrays.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ModuleId::FL => "FL",
            ModuleId::FR => "FR",
            ModuleId::BL => "BL",
            ModuleId::BR => "BR",
        };
        write!(f, "{}", s)
    }
}
