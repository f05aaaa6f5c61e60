//! # Telecommand definitions
//!
//! Telecommands are the instructions sent to the executable by the operator,
//! either live or through a script. They are serialised as JSON, with unit
//! commands as bare strings (`"Flip"`) and payload commands as tagged
//! objects (`{"Manual": {"demand": 0.3}}`).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tc {
    /// Enter safe mode: interrupt all tasks and stop all actuators.
    MakeSafe,

    /// Leave safe mode, provided it was entered by a `MakeSafe` command.
    MakeUnsafe,

    /// Set the operator's manual jog demand for the flipper arm.
    Manual {
        /// Jog demand in `[-1, 1]`.
        demand: f64,
    },

    // ---- FLIPPER MOVES ----

    /// Rotate the arm over the top to the other side.
    Flip,

    /// Move the arm to the current side's scoring position.
    Scoring,

    /// Move the arm to the current side's pickup position.
    Pickup,

    // ---- MANIPULATOR PRIMITIVES ----

    OpenBeak,
    CloseBeak,
    ExtendArms,
    RetractArms,
    RollerIntake,
    RollerEject,
    RollerStop,

    // ---- MANIPULATOR SEQUENCES ----

    /// Hold-to-intake: arms out and rollers in until a gamepiece arrives.
    Intake,

    /// Timed cargo eject.
    Eject,

    /// Full cargo pickup sequence.
    PickUpCargo,

    /// Full cargo release sequence.
    ReleaseCargo,

    /// Full hatch pickup sequence.
    PickUpHatch,
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
