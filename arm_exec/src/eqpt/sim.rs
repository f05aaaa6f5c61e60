//! # Simulated equipment
//!
//! Provides in-memory implementations of the equipment traits, with shared
//! handles so the simulation (and the tests) can inspect actuator demands
//! and drive sensor values. The arm itself is modelled as a simple
//! first-order plant: the potentiometer reading moves against the flip
//! motor demand at a fixed rate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::cell::Cell;
use std::rc::Rc;

// Internal
use super::{DriveActuator, Equipment, PositionSensor, Switch};
use util::maths;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Full-range travel rate of the simulated arm at full drive.
///
/// Units: normalised potentiometer units per second
pub const SIM_FLIP_RATE: f64 = 0.5;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Shared handles into the simulated equipment.
#[derive(Clone)]
pub struct SimHandles {
    pub pot: Rc<Cell<f64>>,
    pub flip_drive: Rc<Cell<f64>>,
    pub rollers_drive: Rc<Cell<f64>>,
    pub beak_drive: Rc<Cell<f64>>,
    pub arms_drive: Rc<Cell<f64>>,
    pub gamepiece: Rc<Cell<bool>>,
    pub folded_back: Rc<Cell<bool>>,
    pub intake_position: Rc<Cell<bool>>,
}

struct SimPot(Rc<Cell<f64>>);
struct SimMotor(Rc<Cell<f64>>);
struct SimSwitch(Rc<Cell<bool>>);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PositionSensor for SimPot {
    fn read(&self) -> f64 {
        self.0.get()
    }
}

impl DriveActuator for SimMotor {
    fn write(&mut self, demand: f64) {
        self.0.set(maths::clamp(&demand, &-1.0, &1.0));
    }
}

impl Switch for SimSwitch {
    fn is_active(&self) -> bool {
        self.0.get()
    }
}

impl SimHandles {
    /// Advance the simulated arm by one cycle.
    ///
    /// Positive flip drive moves the reading downwards, matching the rigging
    /// of the real potentiometer.
    pub fn cycle(&self, dt_s: f64) {
        let rate = maths::lin_map(
            (-1.0, 1.0),
            (SIM_FLIP_RATE, -SIM_FLIP_RATE),
            self.flip_drive.get()
        );

        let pot = self.pot.get() + rate * dt_s;
        self.pot.set(maths::clamp(&pot, &0.0, &1.0));
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build a full set of simulated equipment with the arm at the given
/// starting position.
pub fn sim_equipment(initial_pot: f64) -> (Equipment, SimHandles) {
    let handles = SimHandles {
        pot: Rc::new(Cell::new(initial_pot)),
        flip_drive: Rc::new(Cell::new(0.0)),
        rollers_drive: Rc::new(Cell::new(0.0)),
        beak_drive: Rc::new(Cell::new(0.0)),
        arms_drive: Rc::new(Cell::new(0.0)),
        gamepiece: Rc::new(Cell::new(false)),
        folded_back: Rc::new(Cell::new(false)),
        intake_position: Rc::new(Cell::new(false)),
    };

    let eqpt = Equipment {
        angle_pot: Box::new(SimPot(handles.pot.clone())),
        flip_motor: Box::new(SimMotor(handles.flip_drive.clone())),
        rollers_motor: Box::new(SimMotor(handles.rollers_drive.clone())),
        beak_piston: Box::new(SimMotor(handles.beak_drive.clone())),
        arms_piston: Box::new(SimMotor(handles.arms_drive.clone())),
        gamepiece_switch: Box::new(SimSwitch(handles.gamepiece.clone())),
        folded_back_switch: Box::new(SimSwitch(handles.folded_back.clone())),
        intake_position_switch: Box::new(
            SimSwitch(handles.intake_position.clone())
        ),
    };

    (eqpt, handles)
}
