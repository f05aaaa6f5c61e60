//! # Manipulator tasks
//!
//! Tasks driving the manipulator's pistons and rollers, plus the canned
//! chains for picking up and releasing gamepieces.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::eqpt::SwitchId;
use crate::exec::{
    InstantAction, Resource, ResourceSet, Task, TaskChain, TaskCtx, Wait};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Piston demand for the forward throw (beak open, arms extended).
pub const PISTON_FORWARD: f64 = 1.0;

/// Piston demand for the reverse throw (beak closed, arms retracted).
pub const PISTON_REVERSE: f64 = -1.0;

/// Roller drive used when intaking a gamepiece.
pub const ROLLER_INTAKE_DRIVE: f64 = 0.7;

/// Roller drive used when ejecting a gamepiece.
pub const ROLLER_EJECT_DRIVE: f64 = -0.7;

/// Cycle budget for a gamepiece check step before it gives up waiting.
const GAMEPIECE_CHECK_TIMEOUT_CYCLES: u64 = 250;

/// Cycles the rollers keep ejecting after the gamepiece has left, making
/// sure it is fully clear of the manipulator.
const EJECT_RUN_ON_CYCLES: u64 = 25;

// ---------------------------------------------------------------------------
// INSTANT TASKS
// ---------------------------------------------------------------------------

/// Open the manipulator's beak.
pub fn open_beak() -> Box<dyn Task> {
    Box::new(InstantAction::new(
        "OpenBeak",
        ResourceSet::of(&[Resource::Beak]),
        |ctx| ctx.eqpt.beak_piston.write(PISTON_FORWARD)
    ))
}

/// Close the manipulator's beak.
pub fn close_beak() -> Box<dyn Task> {
    Box::new(InstantAction::new(
        "CloseBeak",
        ResourceSet::of(&[Resource::Beak]),
        |ctx| ctx.eqpt.beak_piston.write(PISTON_REVERSE)
    ))
}

/// Extend the manipulator's intake arms.
pub fn extend_arms() -> Box<dyn Task> {
    Box::new(InstantAction::new(
        "ExtendArms",
        ResourceSet::of(&[Resource::IntakeArms]),
        |ctx| ctx.eqpt.arms_piston.write(PISTON_FORWARD)
    ))
}

/// Retract the manipulator's intake arms.
pub fn retract_arms() -> Box<dyn Task> {
    Box::new(InstantAction::new(
        "RetractArms",
        ResourceSet::of(&[Resource::IntakeArms]),
        |ctx| ctx.eqpt.arms_piston.write(PISTON_REVERSE)
    ))
}

/// Run the rollers inwards.
pub fn roller_intake() -> Box<dyn Task> {
    Box::new(InstantAction::new(
        "RollerIntake",
        ResourceSet::of(&[Resource::Rollers]),
        |ctx| ctx.eqpt.rollers_motor.write(ROLLER_INTAKE_DRIVE)
    ))
}

/// Run the rollers outwards.
pub fn roller_eject() -> Box<dyn Task> {
    Box::new(InstantAction::new(
        "RollerEject",
        ResourceSet::of(&[Resource::Rollers]),
        |ctx| ctx.eqpt.rollers_motor.write(ROLLER_EJECT_DRIVE)
    ))
}

/// Stop the rollers.
pub fn roller_stop() -> Box<dyn Task> {
    Box::new(InstantAction::new(
        "RollerStop",
        ResourceSet::of(&[Resource::Rollers]),
        |ctx| ctx.eqpt.rollers_motor.write(0.0)
    ))
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Wait for the gamepiece switch to reach a wanted state.
///
/// Finishes either when the switch matches or when the cycle budget runs
/// out, so a chain containing a check can never wedge the manipulator's
/// resources forever.
pub struct GamepieceCheck {
    want_present: bool,
    elapsed: u64,
}

/// Hold-to-intake task: extends the arms and runs the rollers until a
/// gamepiece arrives.
pub struct Intake;

/// Timed cargo eject: runs the rollers outwards for a fixed number of
/// cycles, then stops them.
pub struct EjectBall {
    elapsed: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GamepieceCheck {
    /// Wait for a gamepiece to be present.
    pub fn present() -> Self {
        Self {
            want_present: true,
            elapsed: 0,
        }
    }

    /// Wait for the gamepiece to be gone.
    pub fn absent() -> Self {
        Self {
            want_present: false,
            elapsed: 0,
        }
    }
}

impl Task for GamepieceCheck {
    fn name(&self) -> &str {
        if self.want_present {
            "GamepieceCheck(present)"
        } else {
            "GamepieceCheck(absent)"
        }
    }

    fn resources(&self) -> ResourceSet {
        // The gamepiece switch belongs to the rollers group
        ResourceSet::of(&[Resource::Rollers])
    }

    fn step(&mut self, _ctx: &mut TaskCtx) {
        self.elapsed += 1;
    }

    fn is_finished(&mut self, ctx: &mut TaskCtx) -> bool {
        ctx.eqpt.read_switch(SwitchId::Gamepiece) == self.want_present
            || self.elapsed >= GAMEPIECE_CHECK_TIMEOUT_CYCLES
    }
}

impl Task for Intake {
    fn name(&self) -> &str {
        "Intake"
    }

    fn resources(&self) -> ResourceSet {
        ResourceSet::of(&[Resource::Rollers, Resource::IntakeArms])
    }

    fn start(&mut self, ctx: &mut TaskCtx) {
        ctx.eqpt.arms_piston.write(PISTON_FORWARD);
        ctx.eqpt.rollers_motor.write(ROLLER_INTAKE_DRIVE);
    }

    fn is_finished(&mut self, ctx: &mut TaskCtx) -> bool {
        ctx.eqpt.read_switch(SwitchId::Gamepiece)
    }

    fn end(&mut self, ctx: &mut TaskCtx, _interrupted: bool) {
        ctx.eqpt.rollers_motor.write(0.0);
        ctx.eqpt.arms_piston.write(PISTON_REVERSE);
    }
}

impl EjectBall {
    pub fn new() -> Self {
        Self { elapsed: 0 }
    }
}

impl Default for EjectBall {
    fn default() -> Self {
        Self::new()
    }
}

impl Task for EjectBall {
    fn name(&self) -> &str {
        "EjectBall"
    }

    fn resources(&self) -> ResourceSet {
        ResourceSet::of(&[Resource::Rollers])
    }

    fn start(&mut self, ctx: &mut TaskCtx) {
        ctx.eqpt.rollers_motor.write(ROLLER_EJECT_DRIVE);
    }

    fn step(&mut self, _ctx: &mut TaskCtx) {
        self.elapsed += 1;
    }

    fn is_finished(&mut self, _ctx: &mut TaskCtx) -> bool {
        self.elapsed >= EJECT_RUN_ON_CYCLES
    }

    fn end(&mut self, ctx: &mut TaskCtx, _interrupted: bool) {
        ctx.eqpt.rollers_motor.write(0.0);
    }
}

// ---------------------------------------------------------------------------
// CHAINS
// ---------------------------------------------------------------------------

/// Full cargo pickup sequence.
pub fn pick_up_cargo() -> Box<dyn Task> {
    Box::new(
        TaskChain::new("PickUpCargo")
            .then(open_beak())
            .then(roller_intake())
            .then(retract_arms())
            .then(Box::new(GamepieceCheck::present()))
            .then(roller_stop())
    )
}

/// Full cargo release sequence.
///
/// The rollers keep ejecting for a short run-on after the gamepiece switch
/// releases, so the cargo clears the manipulator fully before they stop.
pub fn release_cargo() -> Box<dyn Task> {
    Box::new(
        TaskChain::new("ReleaseCargo")
            .then(roller_eject())
            .then(Box::new(GamepieceCheck::absent()))
            .then(Box::new(Wait::new(EJECT_RUN_ON_CYCLES)))
            .then(roller_stop())
    )
}

/// Full hatch pickup sequence.
///
/// The beak closes to slot inside the hatch, then springs open to grip it
/// from within once the hatch is seated.
pub fn pick_up_hatch() -> Box<dyn Task> {
    Box::new(
        TaskChain::new("PickUpHatch")
            .then(close_beak())
            .then(retract_arms())
            .then(Box::new(GamepieceCheck::present()))
            .then(open_beak())
    )
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::exec::Executive;
    use crate::test_util::test_ctx_parts;

    /// Run one executive tick against the given context parts.
    macro_rules! tick {
        ($exec:expr, $eqpt:expr, $arm:expr, $ops:expr) => {{
            let mut ctx = TaskCtx {
                eqpt: &mut $eqpt,
                arm: &mut $arm,
                ops: &$ops
            };
            $exec.tick(&mut ctx);
        }};
    }

    #[test]
    fn test_pick_up_cargo_chain() {
        let (mut eqpt, handles, mut arm, ops) = test_ctx_parts(0.8);
        let mut exec = Executive::default();

        exec.request(pick_up_cargo());

        // Beak opens, rollers spin up, arms retract, one step per tick
        tick!(exec, eqpt, arm, ops);
        assert_eq!(handles.beak_drive.get(), PISTON_FORWARD);

        tick!(exec, eqpt, arm, ops);
        assert_eq!(handles.rollers_drive.get(), ROLLER_INTAKE_DRIVE);

        tick!(exec, eqpt, arm, ops);
        assert_eq!(handles.arms_drive.get(), PISTON_REVERSE);

        // The chain now waits on the gamepiece switch, rollers still running
        for _ in 0..10 {
            tick!(exec, eqpt, arm, ops);
        }
        assert_eq!(handles.rollers_drive.get(), ROLLER_INTAKE_DRIVE);
        assert_eq!(exec.num_tasks(), 1);

        // Gamepiece arrives: the check passes and the rollers stop
        handles.gamepiece.set(true);
        tick!(exec, eqpt, arm, ops);
        tick!(exec, eqpt, arm, ops);

        assert_eq!(handles.rollers_drive.get(), 0.0);
        assert_eq!(exec.num_tasks(), 0);
    }

    #[test]
    fn test_release_cargo_chain() {
        let (mut eqpt, handles, mut arm, ops) = test_ctx_parts(0.8);
        let mut exec = Executive::default();

        handles.gamepiece.set(true);
        exec.request(release_cargo());

        // Rollers eject, then the chain waits for the gamepiece to leave
        tick!(exec, eqpt, arm, ops);
        assert_eq!(handles.rollers_drive.get(), ROLLER_EJECT_DRIVE);

        for _ in 0..10 {
            tick!(exec, eqpt, arm, ops);
        }
        assert_eq!(exec.num_tasks(), 1);

        // Gamepiece leaves: the rollers run on for a while before stopping
        handles.gamepiece.set(false);
        tick!(exec, eqpt, arm, ops);
        for _ in 0..10 {
            tick!(exec, eqpt, arm, ops);
            assert_eq!(handles.rollers_drive.get(), ROLLER_EJECT_DRIVE);
        }

        for _ in 0..(EJECT_RUN_ON_CYCLES + 2) {
            tick!(exec, eqpt, arm, ops);
        }
        assert_eq!(handles.rollers_drive.get(), 0.0);
        assert_eq!(exec.num_tasks(), 0);
    }

    #[test]
    fn test_pick_up_hatch_chain() {
        let (mut eqpt, handles, mut arm, ops) = test_ctx_parts(0.8);
        let mut exec = Executive::default();

        exec.request(pick_up_hatch());

        tick!(exec, eqpt, arm, ops);
        assert_eq!(handles.beak_drive.get(), PISTON_REVERSE);

        tick!(exec, eqpt, arm, ops);
        assert_eq!(handles.arms_drive.get(), PISTON_REVERSE);

        // Hatch seats against the switch, beak springs open to grip it
        handles.gamepiece.set(true);
        tick!(exec, eqpt, arm, ops);
        tick!(exec, eqpt, arm, ops);

        assert_eq!(handles.beak_drive.get(), PISTON_FORWARD);
        assert_eq!(exec.num_tasks(), 0);
    }

    #[test]
    fn test_gamepiece_check_times_out() {
        let (mut eqpt, _handles, mut arm, ops) = test_ctx_parts(0.8);
        let mut check = GamepieceCheck::present();

        let mut ctx = TaskCtx {
            eqpt: &mut eqpt,
            arm: &mut arm,
            ops: &ops
        };

        // The switch never closes, the check finishes on its budget instead
        for _ in 0..GAMEPIECE_CHECK_TIMEOUT_CYCLES {
            assert!(!check.is_finished(&mut ctx));
            check.step(&mut ctx);
        }
        assert!(check.is_finished(&mut ctx));
    }

    #[test]
    fn test_intake_holds_until_gamepiece() {
        let (mut eqpt, handles, mut arm, ops) = test_ctx_parts(0.8);
        let mut exec = Executive::default();

        exec.request(Box::new(Intake));

        tick!(exec, eqpt, arm, ops);
        assert_eq!(handles.arms_drive.get(), PISTON_FORWARD);
        assert_eq!(handles.rollers_drive.get(), ROLLER_INTAKE_DRIVE);

        for _ in 0..5 {
            tick!(exec, eqpt, arm, ops);
        }
        assert_eq!(exec.num_tasks(), 1);

        // Gamepiece arrives: rollers stop and the arms fold back in
        handles.gamepiece.set(true);
        tick!(exec, eqpt, arm, ops);

        assert_eq!(handles.rollers_drive.get(), 0.0);
        assert_eq!(handles.arms_drive.get(), PISTON_REVERSE);
        assert_eq!(exec.num_tasks(), 0);
    }

    #[test]
    fn test_eject_ball_timed() {
        let (mut eqpt, handles, mut arm, ops) = test_ctx_parts(0.8);
        let mut exec = Executive::default();

        handles.gamepiece.set(true);
        exec.request(Box::new(EjectBall::new()));

        tick!(exec, eqpt, arm, ops);
        assert_eq!(handles.rollers_drive.get(), ROLLER_EJECT_DRIVE);

        for _ in 0..EJECT_RUN_ON_CYCLES {
            tick!(exec, eqpt, arm, ops);
        }

        assert_eq!(handles.rollers_drive.get(), 0.0);
        assert_eq!(exec.num_tasks(), 0);
    }
}
