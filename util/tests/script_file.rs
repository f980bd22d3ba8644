//! Loading scripts and parameter files from disk.

use serde::Deserialize;
use std::path::PathBuf;

use util::{
    params::{self, LoadError},
    script_interpreter::{PendingCmds, ScriptError, ScriptInterpreter},
};

#[derive(Debug, Deserialize, PartialEq)]
enum Cmd {
    Start,
    Speed { value: f64 },
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
struct Gains {
    k_p: f64,
    k_d: f64,
    enabled: bool,
}

impl Default for Gains {
    fn default() -> Self {
        Self {
            k_p: 1.0,
            k_d: 0.0,
            enabled: true,
        }
    }
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("util_it_{}_{}", std::process::id(), name));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_script_from_file() {
    let path = temp_file(
        "script.sc",
        "0.0: \"Start\";\n0.25: {\"Speed\": {\"value\": 0.5}};\n1.0: {\"Speed\": {\"value\": 0.0}};\n"
    );

    let mut si: ScriptInterpreter<Cmd> = ScriptInterpreter::new(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(si.get_num_cmds(), 3);
    assert!((si.get_duration() - 1.0).abs() < 1e-12);

    let mut executed = vec![];
    let mut t = 0.0;
    loop {
        match si.get_pending_cmds(t) {
            PendingCmds::None => (),
            PendingCmds::Some(mut cmds) => executed.append(&mut cmds),
            PendingCmds::EndOfScript => break,
        }
        t += 0.1;
    }

    assert_eq!(
        executed,
        vec![
            Cmd::Start,
            Cmd::Speed { value: 0.5 },
            Cmd::Speed { value: 0.0 },
        ]
    );
}

#[test]
fn test_missing_script() {
    let res: Result<ScriptInterpreter<Cmd>, _> =
        ScriptInterpreter::new("/this/script/does/not/exist.sc");
    assert!(matches!(res, Err(ScriptError::ScriptNotFound(_))));
}

#[test]
fn test_partial_params_file() {
    let path = temp_file("gains.toml", "k_d = 0.25\n");

    let gains: Gains = params::load_from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(
        gains,
        Gains {
            k_p: 1.0,
            k_d: 0.25,
            enabled: true,
        }
    );
}

#[test]
fn test_malformed_params_file() {
    let path = temp_file("bad.toml", "k_p = \"fast\"\n");

    let res: Result<Gains, _> = params::load_from_path(&path);
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(res, Err(LoadError::DeserialiseError(_))));
}
