//! # Arm control module
//!
//! ArmCtrl closes the position loop on the flipper arm. It combines three
//! pieces:
//!
//! - a PID position controller driving the arm towards a setpoint,
//! - a safety clamp which rewrites any requested drive so the arm can never
//!   be driven into its hard stops,
//! - a side state machine tracking which of the two operating sides the arm
//!   currently occupies.
//!
//! The module has no knowledge of the devices themselves, it operates purely
//! on normalised potentiometer readings (in `[0, 1]`) and signed drive
//! demands (in `[-1, 1]`).

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod clamp;
mod params;
mod pid;
mod side;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use clamp::*;
pub use params::*;
pub use pid::*;
pub use side::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ArmCtrl cyclic processing.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlError {
    #[error(
        "Position sensor reading ({0}) is outside the plausible range \
        [{1}, {2}]")]
    SensorFault(f64, f64, f64),

    #[error("The arm's side has not been resolved yet")]
    SideNotResolved,
}

/// Possible errors that can occur during ArmCtrl initialisation.
///
/// Limit errors are fatal, there is no safe way to run the arm with a bad
/// limit configuration.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlInitError {
    #[error("Failed to load ArmCtrl parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid clamp limit configuration: {0}")]
    InvalidLimits(String),
}
