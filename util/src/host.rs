//! Host platform (linux for example) utility functions

use std::path::PathBuf;
use uname;

/// Name of the environment variable pointing at the root of the software
/// tree (the directory containing `params/` and `sessions/`).
pub const SW_ROOT_ENV_VAR: &str = "SWERVE_SW_ROOT";

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the root directory of the software tree from the environment.
pub fn get_swerve_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
