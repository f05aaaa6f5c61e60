//! # Arm executable library.
//!
//! This library allows other crates in the workspace (and the integration
//! tests) to access items defined inside the arm crate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Arm control module - closed loop position control, safety clamping and
/// side tracking for the flipper arm
pub mod arm_ctrl;

/// Global data store for the executable
pub mod data_store;

/// Equipment interfaces - narrow sensor/actuator abstractions over the real
/// devices
pub mod eqpt;

/// Task executive - cooperative task scheduling, chaining and resource
/// arbitration
pub mod exec;

/// Concrete tasks for the flipper and manipulator mechanisms
pub mod tasks;

/// Telecommand definitions
pub mod tc;

/// Telecommand processor - turns telecommands into task requests
pub mod tc_processor;

#[cfg(test)]
pub(crate) mod test_util;
