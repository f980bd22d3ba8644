//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::Path;
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (SWERVE_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parmeter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the "$SWERVE_SW_ROOT/params" directory
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned
{
    // Get the params dir
    let mut path = crate::host::get_swerve_sw_root()
        .map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    load_from_path(path)
}

/// Load a parameter file from an explicit path.
pub fn load_from_path<P, T>(path: T) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    T: AsRef<Path>
{
    // Load the file into a string
    let params_str = read_to_string(path)
        .map_err(LoadError::FileLoadError)?;

    // Parse the string into the parameter struct
    toml::from_str(params_str.as_str())
        .map_err(LoadError::DeserialiseError)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestParams {
        gain: f64,
        offsets_m: [[f64; 2]; 2],
    }

    #[test]
    fn test_load_from_path() {
        let mut path = std::env::temp_dir();
        path.push(format!("util_params_test_{}.toml", std::process::id()));
        std::fs::write(&path, "gain = 4.6\noffsets_m = [[0.1, 0.2], [-0.1, -0.2]]\n")
            .unwrap();

        let p: TestParams = load_from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(p, TestParams {
            gain: 4.6,
            offsets_m: [[0.1, 0.2], [-0.1, -0.2]]
        });
    }

    #[test]
    fn test_load_missing_file() {
        let res: Result<TestParams, _> = load_from_path("/definitely/not/here.toml");
        assert!(matches!(res, Err(LoadError::FileLoadError(_))));
    }
}
