//! # Swerve drive library.
//!
//! This library allows other crates in the workspace to access items defined
//! inside the swerve drive crate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Chassis kinematics - converts a chassis velocity into a target state for
/// each wheel
pub mod chassis_kin;

/// Command processor - applies operator commands to the data store
pub mod cmd_processor;

/// Data store - state carried between cycles by the executable
pub mod data_store;

/// Drive control - chassis level operations and actuator ownership
pub mod drive_ctrl;

/// Hardware abstraction - capability traits for the module hardware and gyro,
/// and idealised implementations of them
pub mod hal;

/// Heading estimation - integrates the gyro rate into a field heading
pub mod heading_est;

/// Input shaping - converts joystick axes into a chassis velocity demand
pub mod input_shaper;

/// Module control - the steer and drive loops of a single swerve module
pub mod module_ctrl;
