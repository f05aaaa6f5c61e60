//! # Equipment interfaces
//!
//! The core only ever sees the mechanisms through the narrow traits in this
//! module: a position sensor yielding a normalised reading, a drive actuator
//! accepting a signed demand in `[-1, 1]`, and a digital switch. The real
//! device drivers live behind these traits and are not part of this
//! repository; a simulation backend is provided in [`sim`] for the
//! executable and the tests.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod sim;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A sensor yielding a normalised position reading.
pub trait PositionSensor {
    /// Read the current position. Pure, no side effects.
    fn read(&self) -> f64;
}

/// An actuator accepting a signed drive demand.
pub trait DriveActuator {
    /// Write a demand in `[-1, 1]`. The last write each cycle wins.
    fn write(&mut self, demand: f64);
}

/// A digital sensor yielding a boolean.
pub trait Switch {
    /// True if the switch is currently pressed/active.
    fn is_active(&self) -> bool;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Identifies one of the manipulator's limit switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchId {
    Gamepiece,
    FoldedBack,
    IntakePosition,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The full set of equipment the executable drives.
pub struct Equipment {
    /// Potentiometer sensing the flipper arm angle
    pub angle_pot: Box<dyn PositionSensor>,

    /// Motor rotating the flipper arm
    pub flip_motor: Box<dyn DriveActuator>,

    /// Motor driving the manipulator's intake rollers
    pub rollers_motor: Box<dyn DriveActuator>,

    /// Piston opening (+1) and closing (-1) the manipulator's beak
    pub beak_piston: Box<dyn DriveActuator>,

    /// Piston extending (+1) and retracting (-1) the manipulator's arms
    pub arms_piston: Box<dyn DriveActuator>,

    /// Switch active when a gamepiece is held
    pub gamepiece_switch: Box<dyn Switch>,

    /// Switch active when the manipulator is folded back
    pub folded_back_switch: Box<dyn Switch>,

    /// Switch active when the manipulator is at the intake position
    pub intake_position_switch: Box<dyn Switch>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Equipment {
    /// Read one of the limit switches by id.
    pub fn read_switch(&self, id: SwitchId) -> bool {
        match id {
            SwitchId::Gamepiece => self.gamepiece_switch.is_active(),
            SwitchId::FoldedBack => self.folded_back_switch.is_active(),
            SwitchId::IntakePosition =>
                self.intake_position_switch.is_active(),
        }
    }
}
