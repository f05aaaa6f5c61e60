//! # Task library
//!
//! Concrete tasks and chains for the arm and manipulator, built on the
//! executive's task model.

pub mod flipper;
pub mod manipulator;

pub use flipper::{ManualRotate, MoveGoal, MoveToPosition};
pub use manipulator::{EjectBall, GamepieceCheck, Intake};
