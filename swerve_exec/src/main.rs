//! Main swerve drive executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Sensor acquisition:
//!             - Gyro, heading integration
//!             - Steer and drive encoders of every module
//!         - Operator command processing
//!         - Input shaping
//!         - Drive control, writing every actuator
//!         - Cycle management
//!
//! # Modules
//!
//! Stateful cyclic modules (e.g. `input_shaper`) implement the
//! `util::module::State` trait.
//!
//! # Usage
//!
//! ```text
//! swerve_exec <script path>
//! ```
//!
//! The hardware is idealised: every module reaches the target it is given
//! and the gyro reports the commanded rotation rate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::{eyre, WrapErr}, Report};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use swerve_lib::{
    cmd_processor::{self, Cmd},
    data_store::DataStore,
    drive_ctrl::{self, DriveCtrl},
    hal::{IdealGyro, IdealModuleHw},
    input_shaper::{self, InputShaper},
    module_ctrl,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
    script_interpreter::{PendingCmds, ScriptInterpreter},
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "swerve_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Swerve Drive Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let input_shaper_params: input_shaper::Params = util::params::load(
        "input_shaper.toml"
    ).wrap_err("Could not load InputShaper params")?;

    let module_ctrl_params: module_ctrl::Params = util::params::load(
        "module_ctrl.toml"
    ).wrap_err("Could not load ModuleCtrl params")?;

    let drive_ctrl_params: drive_ctrl::Params = util::params::load(
        "drive_ctrl.toml"
    ).wrap_err("Could not load DriveCtrl params")?;

    // Every module runs at the executable's cycle period
    let cycle_period_s = drive_ctrl_params.cycle_period_s;
    for (name, period_s) in [
        ("InputShaper", input_shaper_params.cycle_period_s),
        ("ModuleCtrl", module_ctrl_params.cycle_period_s),
    ].iter() {
        if (period_s - cycle_period_s).abs() > 1e-9 {
            return Err(eyre!(
                "{} cycle period ({} s) differs from the DriveCtrl period ({} s)",
                name, period_s, cycle_period_s
            ));
        }
    }

    info!("Exec parameters loaded");

    // ---- INITIALISE SCRIPT ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() != 2 {
        return Err(eyre!(
            "Expected one argument (the script path), found {}", args.len() - 1
        ));
    }

    info!("Loading script from \"{}\"", &args[1]);

    let mut script: ScriptInterpreter<Cmd> = ScriptInterpreter::new(&args[1])
        .wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} commands\n",
        script.get_duration(),
        script.get_num_cmds()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let offsets = drive_ctrl_params.abs_offsets_rad;
    let hw = [
        IdealModuleHw::new(cycle_period_s, offsets[0]),
        IdealModuleHw::new(cycle_period_s, offsets[1]),
        IdealModuleHw::new(cycle_period_s, offsets[2]),
        IdealModuleHw::new(cycle_period_s, offsets[3]),
    ];

    let drive_ctrl = DriveCtrl::new(
        hw,
        IdealGyro::default(),
        &drive_ctrl_params,
        &module_ctrl_params
    ).wrap_err("Failed to initialise DriveCtrl")?;
    info!("DriveCtrl init complete");

    let input_shaper = InputShaper::new(input_shaper_params);

    let mut ds = DataStore::new(input_shaper, drive_ctrl);

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(cycle_period_s);

        // ---- DATA INPUT ----

        if let Err(e) = ds.sample() {
            warn!("Error during sensor acquisition: {}", e);
        }

        // ---- COMMAND PROCESSING ----

        match script.get_pending_cmds(ds.cycle_time_s) {
            PendingCmds::None => (),
            PendingCmds::Some(cmd_vec) => {
                for cmd in cmd_vec.iter() {
                    cmd_processor::exec(&mut ds, cmd);
                }
            },
            // Exit if end of script reached
            PendingCmds::EndOfScript => {
                info!("End of script reached, stopping");
                break
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        if let Err(e) = ds.control() {
            warn!("Error during drive control processing: {}", e);
        }

        if ds.is_1_hz_cycle && ds.is_teleop_enabled() {
            info!(
                "Heading {:.3} rad, demand {:?}",
                ds.heading_rad,
                ds.input_shaper_output
            );

            match serde_json::to_string(&ds.drive_ctrl_status_rpt) {
                Ok(s) => debug!("DriveCtrl status: {}", s),
                Err(e) => warn!("Could not serialise the DriveCtrl status: {}", e)
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(cycle_period_s)
            .checked_sub(cycle_dur)
        {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            },
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period_s
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    ds.disable_teleop().wrap_err("Failed to release the drive")?;

    info!("End of execution after {} cycles", ds.num_cycles);

    Ok(())
}
