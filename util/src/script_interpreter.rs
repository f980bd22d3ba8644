//! # Script interpreter module
//!
//! This module provides an interpreter for timed command scripts, allowing
//! an executable to be driven from a file rather than a live operator.
//!
//! A script is a sequence of entries of the form
//!
//! ```text
//! <exec time in seconds>: <JSON payload>;
//! ```
//!
//! Anything not matching that pattern (blank lines, `#` comments) is ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
struct Command<T> {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The payload to execute
    payload: T
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_cmds` to acquire a list of commands that need executing.
pub struct ScriptInterpreter<T> {
    _script_path: PathBuf,
    cmds: VecDeque<Command<T>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid command at {0} s: {1}")]
    InvalidCmd(f64, serde_json::Error)
}

/// Commands that the script wants executed on this cycle.
#[derive(Debug, PartialEq)]
pub enum PendingCmds<T> {
    None,
    Some(Vec<T>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> ScriptInterpreter<T>
where
    T: DeserializeOwned
{

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(
                ScriptError::ScriptNotFound(path.to_string_lossy().to_string()));
        }

        // Load the script into a string
        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        let cmds = Self::parse(&script)?;

        Ok(ScriptInterpreter {
            _script_path: path,
            cmds
        })
    }

    /// Create a new interpreter directly from the script text.
    pub fn from_text(script: &str) -> Result<Self, ScriptError> {
        Ok(ScriptInterpreter {
            _script_path: PathBuf::new(),
            cmds: Self::parse(script)?
        })
    }

    /// Return the commands whose execution time is earlier than or equal to
    /// `current_time_s`.
    pub fn get_pending_cmds(&mut self, current_time_s: f64) -> PendingCmds<T> {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingCmds::EndOfScript
        }

        let mut cmd_vec: Vec<T> = vec![];

        // Pop items from the queue while the head's exec time has been
        // reached.
        while self.cmds
            .front()
            .map(|c| c.exec_time_s <= current_time_s)
            .unwrap_or(false)
        {
            if let Some(c) = self.cmds.pop_front() {
                cmd_vec.push(c.payload);
            }
        }

        if cmd_vec.is_empty() {
            PendingCmds::None
        }
        else {
            PendingCmds::Some(cmd_vec)
        }
    }

    /// Get the number of commands remaining in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }

    fn parse(script: &str) -> Result<VecDeque<Command<T>>, ScriptError> {
        // Empty queue of commands
        let mut cmd_queue: VecDeque<Command<T>> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("script regex is valid");

        for cap in re.captures_iter(script) {
            let (time_str, payload_str) = match (cap.get(1), cap.get(3)) {
                (Some(t), Some(p)) => (t.as_str(), p.as_str()),
                _ => continue
            };

            // Parse the exec time
            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            // The scripts contain JSON only.
            let payload: T = serde_json::from_str(payload_str)
                .map_err(|e| ScriptError::InvalidCmd(exec_time_s, e))?;

            cmd_queue.push_back(Command {
                exec_time_s,
                payload
            });
        }

        if cmd_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(cmd_queue)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    enum TestCmd {
        Go { speed: f64 },
        Halt
    }

    const SCRIPT: &str = r#"
        # Comments are skipped
        0.0: {"Go": {"speed": 1.5}};
        0.5: "Halt";
        0.5: {"Go": {"speed": -1.0}};
        2.0: "Halt";
    "#;

    #[test]
    fn test_pending_cmds() {
        let mut si: ScriptInterpreter<TestCmd> = ScriptInterpreter::from_text(SCRIPT).unwrap();

        assert_eq!(si.get_num_cmds(), 4);
        assert!((si.get_duration() - 2.0).abs() < 1e-12);

        assert_eq!(
            si.get_pending_cmds(0.0),
            PendingCmds::Some(vec![TestCmd::Go { speed: 1.5 }])
        );
        assert_eq!(si.get_pending_cmds(0.2), PendingCmds::None);
        assert_eq!(
            si.get_pending_cmds(0.5),
            PendingCmds::Some(vec![TestCmd::Halt, TestCmd::Go { speed: -1.0 }])
        );
        assert_eq!(si.get_pending_cmds(10.0), PendingCmds::Some(vec![TestCmd::Halt]));
        assert_eq!(si.get_pending_cmds(10.0), PendingCmds::EndOfScript);
    }

    #[test]
    fn test_empty_script() {
        let res: Result<ScriptInterpreter<TestCmd>, _> =
            ScriptInterpreter::from_text("# nothing here\n");
        assert!(matches!(res, Err(ScriptError::ScriptEmpty)));
    }

    #[test]
    fn test_invalid_cmd() {
        let res: Result<ScriptInterpreter<TestCmd>, _> =
            ScriptInterpreter::from_text("1.0: {\"Fly\": {}};\n");
        assert!(matches!(res, Err(ScriptError::InvalidCmd(t, _)) if (t - 1.0).abs() < 1e-12));
    }
}
