//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::chassis_kin::{ModuleId, WheelGeometry, NUM_MODULES};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for chassis level drive control.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {

    /// Units: seconds
    pub cycle_period_s: f64,

    // ---- GEOMETRY ----

    /// Position of each module's steer axis relative to the chassis centre of
    /// rotation, in `ModuleId` order (FL, FR, BL, BR).
    ///
    /// Units: meters,
    /// Frame: Chassis
    pub module_pos_m: [[f64; 2]; NUM_MODULES],

    /// Calibration offset of each module's absolute angle sensor, in
    /// `ModuleId` order.
    ///
    /// Units: radians
    pub abs_offsets_rad: [f64; NUM_MODULES],

    // ---- CAPABILITIES ----

    /// Fastest any wheel can be driven. Wheel targets are scaled down
    /// together so none exceeds this.
    ///
    /// Units: meters/second
    pub max_module_speed_ms: f64,

    /// Fastest rotation the heading hold controller will demand.
    ///
    /// Units: radians/second
    pub max_angular_rate_rads: f64,

    // ---- HEADING HOLD ----

    /// Units: (radians/second)/radian
    pub heading_hold_k_p: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// The geometry of each module.
    pub fn geometry(&self) -> [WheelGeometry; NUM_MODULES] {
        let mut geom = [WheelGeometry::new(ModuleId::FL, 0.0, 0.0); NUM_MODULES];

        for (g, id) in geom.iter_mut().zip(ModuleId::ALL.iter()) {
            let pos = self.module_pos_m[id.index()];
            *g = WheelGeometry::new(*id, pos[0], pos[1]);
        }

        geom
    }
}

impl Default for Params {
    fn default() -> Self {
        // 25 inch square wheel base
        let half_base_m = 0.635 / 2.0;

        Self {
            cycle_period_s: 0.02,
            module_pos_m: [
                [half_base_m, half_base_m],
                [half_base_m, -half_base_m],
                [-half_base_m, half_base_m],
                [-half_base_m, -half_base_m],
            ],
            abs_offsets_rad: [2.351588, 2.109219, 0.971008, 1.366774],
            max_module_speed_ms: 5.7912,
            max_angular_rate_rads: 1920f64.to_radians(),
            heading_hold_k_p: 4.0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let geom = Params::default().geometry();

        assert_eq!(geom[0].id, ModuleId::FL);
        assert_eq!(geom[0].offset_m, [0.3175, 0.3175]);
        assert_eq!(geom[1].offset_m, [0.3175, -0.3175]);
        assert_eq!(geom[3].id, ModuleId::BR);
        assert_eq!(geom[3].offset_m, [-0.3175, -0.3175]);
    }
}
