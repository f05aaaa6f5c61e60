//! # Telecommand processor module
//!
//! The telecommand processor handles TCs coming from any source, turning
//! them into safe mode transitions, operator input updates and task
//! requests.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use crate::data_store::{DataStore, SafeModeCause};
use crate::eqpt::Equipment;
use crate::exec::{Executive, TaskCtx};
use crate::tasks::flipper::{MoveGoal, MoveToPosition};
use crate::tasks::manipulator;
use crate::tasks::{EjectBall, Intake};
use crate::tc::Tc;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore and requests tasks on the executive. While the
/// system is in safe mode every command except `MakeUnsafe` is dropped.
pub fn exec(
    ds: &mut DataStore,
    executive: &mut Executive,
    eqpt: &mut Equipment,
    tc: &Tc
) {
    if ds.safe && *tc != Tc::MakeUnsafe {
        warn!("TC {:?} dropped, system is in safe mode", tc);
        return;
    }

    // Handle different Tcs
    match tc {
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");

            // Tear the tasks down before the datastore goes safe, so their
            // cleanup writes happen while the actuators are still live
            let DataStore { arm_ctrl, ops, .. } = ds;
            let mut ctx = TaskCtx {
                eqpt,
                arm: arm_ctrl,
                ops
            };
            executive.abort_all(&mut ctx);

            stop_all(eqpt);
            ds.make_safe(SafeModeCause::MakeSafeTc);
        }
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            ds.make_unsafe(SafeModeCause::MakeSafeTc).ok();
        }
        Tc::Manual { demand } => {
            ds.ops.flip_demand = *demand;
        }

        // Flipper moves
        Tc::Flip => {
            executive.request(Box::new(MoveToPosition::new(MoveGoal::Flip)));
        }
        Tc::Scoring => {
            executive.request(Box::new(
                MoveToPosition::new(MoveGoal::Scoring)
            ));
        }
        Tc::Pickup => {
            executive.request(Box::new(
                MoveToPosition::new(MoveGoal::Pickup)
            ));
        }

        // Manipulator primitives
        Tc::OpenBeak => {
            executive.request(manipulator::open_beak());
        }
        Tc::CloseBeak => {
            executive.request(manipulator::close_beak());
        }
        Tc::ExtendArms => {
            executive.request(manipulator::extend_arms());
        }
        Tc::RetractArms => {
            executive.request(manipulator::retract_arms());
        }
        Tc::RollerIntake => {
            executive.request(manipulator::roller_intake());
        }
        Tc::RollerEject => {
            executive.request(manipulator::roller_eject());
        }
        Tc::RollerStop => {
            executive.request(manipulator::roller_stop());
        }

        // Manipulator sequences
        Tc::Intake => {
            executive.request(Box::new(Intake));
        }
        Tc::Eject => {
            executive.request(Box::new(EjectBall::new()));
        }
        Tc::PickUpCargo => {
            executive.request(manipulator::pick_up_cargo());
        }
        Tc::ReleaseCargo => {
            executive.request(manipulator::release_cargo());
        }
        Tc::PickUpHatch => {
            executive.request(manipulator::pick_up_hatch());
        }
    }
}

/// Write zero demand to every actuator.
pub fn stop_all(eqpt: &mut Equipment) {
    eqpt.flip_motor.write(0.0);
    eqpt.rollers_motor.write(0.0);
    eqpt.beak_piston.write(0.0);
    eqpt.arms_piston.write(0.0);
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
