//! Main arm executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Simulation stepping and sensor acquisition
//!         - Telecommand processing and handling
//!         - Task executive tick:
//!             - Trigger evaluation
//!             - Resource arbitration
//!             - Task execution
//!         - Safe mode monitoring
//!
//! The loop runs at a fixed 50 Hz. All arm control processing happens inside
//! the tasks granted the flipper resource by the executive.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use arm_lib::{
    data_store::{DataStore, SafeModeCause},
    eqpt::{sim::sim_equipment, SwitchId},
    exec::{Executive, Resource, TaskCtx},
    tasks::manipulator,
    tasks::ManualRotate,
    tc::Tc,
    tc_processor,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::eyre, eyre::WrapErr, Report};
use log::{info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

/// Starting position of the simulated arm.
const SIM_INITIAL_POT: f64 = 0.8;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "arm_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE TC SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    // A single argument gives the script path
    let mut script: ScriptInterpreter<Tc> = if args.len() == 2 {
        let si = ScriptInterpreter::new(&args[1])
            .wrap_err("Failed to load script")?;

        info!(
            "Loaded script lasts {:.02} s and contains {} TCs\n",
            si.get_duration(),
            si.get_num_tcs()
        );

        si
    } else {
        return Err(eyre!(
            "Expected a single argument (the script path), found {}",
            args.len() - 1
        ));
    };

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.arm_ctrl.init("arm_ctrl.toml")
        .wrap_err("Failed to initialise ArmCtrl")?;
    info!("ArmCtrl init complete");

    // ---- INITIALISE EQUIPMENT ----

    let (mut eqpt, sim_handles) = sim_equipment(SIM_INITIAL_POT);
    info!("Simulated equipment initialised");

    // The side must be resolved from the sensor before any task may drive
    // the arm
    ds.arm_ctrl.resolve_side(eqpt.angle_pot.read());

    // ---- INITIALISE EXECUTIVE ----

    let mut executive = Executive::default();

    // Manual rotation holds the flipper whenever no move owns it
    executive.set_default(
        Resource::Flipper,
        Box::new(|| Box::new(ManualRotate))
    );

    // A gamepiece arriving stops the rollers no matter what requested them
    executive.bind_trigger(
        SwitchId::Gamepiece,
        Box::new(manipulator::roller_stop)
    );

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- DATA INPUT ----

        // Step the simulated plant by one cycle
        sim_handles.cycle(CYCLE_PERIOD_S);

        // ---- TELECOMMAND PROCESSING ----

        match script.get_pending_tcs() {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    tc_processor::exec(&mut ds, &mut executive, &mut eqpt, tc);
                }
            }
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of TC script reached, stopping");
                break;
            }
        }

        // ---- TASK EXECUTION ----

        if !ds.safe {
            let DataStore { arm_ctrl, ops, .. } = &mut ds;
            let mut ctx = TaskCtx {
                eqpt: &mut eqpt,
                arm: arm_ctrl,
                ops
            };
            executive.tick(&mut ctx);
        }

        // ---- SAFE MODE MONITORING ----

        // A sensor fault found during task execution pulls the whole system
        // safe, a plausible reading again lifts it
        if ds.arm_ctrl.report().sensor_fault {
            if !ds.safe {
                let DataStore { arm_ctrl, ops, .. } = &mut ds;
                let mut ctx = TaskCtx {
                    eqpt: &mut eqpt,
                    arm: arm_ctrl,
                    ops
                };
                executive.abort_all(&mut ctx);

                tc_processor::stop_all(&mut eqpt);
                ds.make_safe(SafeModeCause::SensorFault);
            }
        } else if ds.safe_cause == Some(SafeModeCause::SensorFault) {
            let reading = eqpt.angle_pot.read();
            if reading >= ds.arm_ctrl.params().min_plausible_reading
                && reading <= ds.arm_ctrl.params().max_plausible_reading
            {
                ds.make_unsafe(SafeModeCause::SensorFault).ok();
            }
        }

        // ---- TELEMETRY ----

        if ds.is_1_hz_cycle {
            info!(
                "pot: {:.3}, side: {:?}, safe: {}, tasks: {}",
                eqpt.angle_pot.read(),
                ds.arm_ctrl.side(),
                ds.safe,
                executive.num_tasks()
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64()
                        - Duration::from_secs_f64(CYCLE_PERIOD_S)
                            .as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    // Leave nothing running
    tc_processor::stop_all(&mut eqpt);

    info!("End of execution");

    Ok(())
}
