//! # Flipper tasks
//!
//! Tasks driving the flipper arm: the manual jog default and the automatic
//! move to a named position.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;

// Internal
use crate::arm_ctrl::{ArmDemand, ArmInput};
use crate::exec::{Resource, ResourceSet, Task, TaskCtx};
use util::maths;
use util::module::State;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Scale applied to the operator's jog demand.
///
/// Manual rotation runs slower than the position loop's full authority so
/// the operator can creep the arm up to a limit.
const MANUAL_DRIVE_SCALE: f64 = 0.5;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The destination of an automatic move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveGoal {
    /// The current side's flip target, crossing to the other side.
    Flip,

    /// The current side's scoring position.
    Scoring,

    /// The current side's pickup position.
    Pickup,

    /// An explicit target reading.
    Position(f64),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Default task for the flipper: drive the motor from the operator's jog
/// demand, through the safety clamp. Never finishes on its own.
pub struct ManualRotate;

/// Automatic move of the flipper arm to a goal position.
pub struct MoveToPosition {
    goal: MoveGoal,

    /// Target reading, resolved from the arm's side at start.
    target: Option<f64>,

    /// Cycles elapsed since the move started.
    elapsed: u64,

    /// Cycle budget for the move, from the arm parameters.
    timeout: u64,

    /// True if the move cannot complete: sensor fault, unresolved side or
    /// timeout.
    failed: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Task for ManualRotate {
    fn name(&self) -> &str {
        "ManualRotate"
    }

    fn resources(&self) -> ResourceSet {
        ResourceSet::of(&[Resource::Flipper])
    }

    fn step(&mut self, ctx: &mut TaskCtx) {
        let demand = maths::lin_map(
            (-1.0, 1.0),
            (-MANUAL_DRIVE_SCALE, MANUAL_DRIVE_SCALE),
            ctx.ops.flip_demand
        );

        let input = ArmInput {
            reading: ctx.eqpt.angle_pot.read(),
            demand: ArmDemand::Manual(demand),
        };

        match ctx.arm.proc(&input) {
            Ok((output, _)) => ctx.eqpt.flip_motor.write(output.flip_drive),
            Err(e) => {
                warn!("Manual rotate: {}", e);
                ctx.eqpt.flip_motor.write(0.0);
            }
        }
    }

    fn is_finished(&mut self, _ctx: &mut TaskCtx) -> bool {
        false
    }

    fn end(&mut self, ctx: &mut TaskCtx, _interrupted: bool) {
        ctx.eqpt.flip_motor.write(0.0);
    }
}

impl MoveToPosition {
    pub fn new(goal: MoveGoal) -> Self {
        Self {
            goal,
            target: None,
            elapsed: 0,
            timeout: 0,
            failed: false,
        }
    }

    /// True if the move ended without reaching its target.
    pub fn failed(&self) -> bool {
        self.failed
    }
}

impl Task for MoveToPosition {
    fn name(&self) -> &str {
        match self.goal {
            MoveGoal::Flip => "MoveToPosition(Flip)",
            MoveGoal::Scoring => "MoveToPosition(Scoring)",
            MoveGoal::Pickup => "MoveToPosition(Pickup)",
            MoveGoal::Position(_) => "MoveToPosition(Position)",
        }
    }

    fn resources(&self) -> ResourceSet {
        ResourceSet::of(&[Resource::Flipper])
    }

    /// Resolve the goal into a target reading for the arm's current side
    /// and start the position loop.
    fn start(&mut self, ctx: &mut TaskCtx) {
        let params = ctx.arm.params();
        self.timeout = params.move_timeout_cycles;

        let side = match ctx.arm.side() {
            Some(s) => s,
            None => {
                warn!("Cannot start a move before the arm side is resolved");
                self.failed = true;
                return;
            }
        };

        let side_params = params.side(side);
        let target = match self.goal {
            MoveGoal::Flip => side_params.flip_target,
            MoveGoal::Scoring => side_params.scoring_target,
            MoveGoal::Pickup => side_params.pickup_target,
            MoveGoal::Position(p) => p,
        };

        self.target = Some(target);
        ctx.arm.enable(target);
    }

    fn step(&mut self, ctx: &mut TaskCtx) {
        if self.failed {
            return;
        }

        self.elapsed += 1;

        let input = ArmInput {
            reading: ctx.eqpt.angle_pot.read(),
            demand: ArmDemand::Auto,
        };

        match ctx.arm.proc(&input) {
            Ok((output, _)) => ctx.eqpt.flip_motor.write(output.flip_drive),
            Err(e) => {
                warn!("Move failed: {}", e);
                self.failed = true;
                ctx.eqpt.flip_motor.write(0.0);
            }
        }
    }

    fn is_finished(&mut self, ctx: &mut TaskCtx) -> bool {
        if self.failed {
            return true;
        }

        if ctx.arm.on_target() {
            return true;
        }

        if self.elapsed >= self.timeout {
            warn!(
                "Move to {:?} timed out after {} cycles",
                self.goal, self.elapsed
            );
            self.failed = true;
            return true;
        }

        false
    }

    /// Stop the motor and the loop. Only a clean arrival updates the side
    /// state, so an interrupted or failed flip leaves the arm on its
    /// original side.
    fn end(&mut self, ctx: &mut TaskCtx, interrupted: bool) {
        ctx.eqpt.flip_motor.write(0.0);
        ctx.arm.disable();

        if !interrupted && !self.failed {
            if let Some(target) = self.target {
                ctx.arm.complete_move(target);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::arm_ctrl::ArmSide;
    use crate::eqpt::sim::SIM_FLIP_RATE;
    use crate::exec::TaskCtx;
    use crate::test_util::test_ctx_parts;

    /// Run a move against the simulated plant until it finishes.
    ///
    /// Returns the number of cycles taken, or `None` on hitting the cycle
    /// cap.
    fn run_move(
        task: &mut MoveToPosition,
        ctx: &mut TaskCtx,
        handles: &crate::eqpt::sim::SimHandles,
        max_cycles: u32
    ) -> Option<u32> {
        task.start(ctx);

        for cycle in 0..max_cycles {
            task.step(ctx);
            handles.cycle(0.02);

            if task.is_finished(ctx) {
                task.end(ctx, false);
                return Some(cycle);
            }
        }

        None
    }

    #[test]
    fn test_flip_crosses_side() {
        let (mut eqpt, handles, mut arm, ops) = test_ctx_parts(0.8);
        assert_eq!(arm.side(), Some(ArmSide::SideA));

        let mut task = MoveToPosition::new(MoveGoal::Flip);
        let mut ctx = TaskCtx {
            eqpt: &mut eqpt,
            arm: &mut arm,
            ops: &ops
        };

        let cycles = run_move(&mut task, &mut ctx, &handles, 500);

        assert!(cycles.is_some());
        assert!(!task.failed());
        assert!((handles.pot.get() - 0.35).abs() < 0.02);
        assert_eq!(arm.side(), Some(ArmSide::SideB));
        assert!(!arm.is_enabled());
        assert_eq!(handles.flip_drive.get(), 0.0);
    }

    #[test]
    fn test_flip_back() {
        let (mut eqpt, handles, mut arm, ops) = test_ctx_parts(0.35);
        assert_eq!(arm.side(), Some(ArmSide::SideB));

        let mut task = MoveToPosition::new(MoveGoal::Flip);
        let mut ctx = TaskCtx {
            eqpt: &mut eqpt,
            arm: &mut arm,
            ops: &ops
        };

        let cycles = run_move(&mut task, &mut ctx, &handles, 500);

        assert!(cycles.is_some());
        assert!((handles.pot.get() - 0.65).abs() < 0.02);
        assert_eq!(arm.side(), Some(ArmSide::SideA));
    }

    #[test]
    fn test_scoring_move_stays_on_side() {
        let (mut eqpt, handles, mut arm, ops) = test_ctx_parts(0.4);
        assert_eq!(arm.side(), Some(ArmSide::SideB));

        let mut task = MoveToPosition::new(MoveGoal::Scoring);
        let mut ctx = TaskCtx {
            eqpt: &mut eqpt,
            arm: &mut arm,
            ops: &ops
        };

        let cycles = run_move(&mut task, &mut ctx, &handles, 500);

        assert!(cycles.is_some());
        assert!((handles.pot.get() - 0.25).abs() < 0.02);
        assert_eq!(arm.side(), Some(ArmSide::SideB));
    }

    #[test]
    fn test_sensor_fault_aborts_move() {
        let (mut eqpt, handles, mut arm, ops) = test_ctx_parts(0.8);

        let mut task = MoveToPosition::new(MoveGoal::Flip);
        let mut ctx = TaskCtx {
            eqpt: &mut eqpt,
            arm: &mut arm,
            ops: &ops
        };

        task.start(&mut ctx);
        task.step(&mut ctx);
        assert!(!task.is_finished(&mut ctx));

        // Pot goes implausible mid-move
        handles.pot.set(5.0);
        task.step(&mut ctx);

        assert!(task.is_finished(&mut ctx));
        assert!(task.failed());
        assert_eq!(handles.flip_drive.get(), 0.0);

        task.end(&mut ctx, false);
        assert!(!arm.is_enabled());
        assert_eq!(arm.side(), Some(ArmSide::SideA));
        assert!(arm.report().sensor_fault);
    }

    #[test]
    fn test_timeout_fails_move() {
        let (mut eqpt, _handles, mut arm, ops) = test_ctx_parts(0.8);

        let mut task = MoveToPosition::new(MoveGoal::Flip);
        let mut ctx = TaskCtx {
            eqpt: &mut eqpt,
            arm: &mut arm,
            ops: &ops
        };

        task.start(&mut ctx);

        // The plant never moves (no sim cycle), so the move must time out
        let timeout = ctx.arm.params().move_timeout_cycles;
        for _ in 0..timeout {
            task.step(&mut ctx);
            if task.is_finished(&mut ctx) {
                break;
            }
        }

        assert!(task.is_finished(&mut ctx));
        assert!(task.failed());

        // A failed move never flips the side
        task.end(&mut ctx, false);
        assert_eq!(arm.side(), Some(ArmSide::SideA));
    }

    #[test]
    fn test_interrupted_move_keeps_side() {
        let (mut eqpt, handles, mut arm, ops) = test_ctx_parts(0.8);

        let mut task = MoveToPosition::new(MoveGoal::Flip);
        let mut ctx = TaskCtx {
            eqpt: &mut eqpt,
            arm: &mut arm,
            ops: &ops
        };

        task.start(&mut ctx);

        // Run far enough to cross the threshold physically
        for _ in 0..40 {
            task.step(&mut ctx);
            handles.cycle(0.02);
        }
        assert!(handles.pot.get() < 0.5);

        // Preempted before arrival: motor stops, side stays A
        task.end(&mut ctx, true);
        assert_eq!(handles.flip_drive.get(), 0.0);
        assert!(!arm.is_enabled());
        assert_eq!(arm.side(), Some(ArmSide::SideA));
    }

    #[test]
    fn test_manual_rotate_through_clamp() {
        let (mut eqpt, handles, mut arm, ops_default) = test_ctx_parts(0.8);

        let mut ops = ops_default;
        ops.flip_demand = 1.0;

        let mut task = ManualRotate;
        let mut ctx = TaskCtx {
            eqpt: &mut eqpt,
            arm: &mut arm,
            ops: &ops
        };

        task.step(&mut ctx);
        assert_eq!(handles.flip_drive.get(), MANUAL_DRIVE_SCALE);
        assert!(!task.is_finished(&mut ctx));

        // At the side A upper limit the clamp forces the drive to zero
        handles.pot.set(0.30);
        task.step(&mut ctx);
        assert_eq!(handles.flip_drive.get(), 0.0);

        // End stops the motor
        handles.pot.set(0.8);
        task.step(&mut ctx);
        assert_eq!(handles.flip_drive.get(), MANUAL_DRIVE_SCALE);
        task.end(&mut ctx, true);
        assert_eq!(handles.flip_drive.get(), 0.0);
    }

    #[test]
    fn test_move_is_faster_than_full_rate_budget() {
        // Sanity check on the tuning: the flip must complete well inside
        // the timeout at the simulated rate
        let (mut eqpt, handles, mut arm, ops) = test_ctx_parts(0.8);

        let mut task = MoveToPosition::new(MoveGoal::Flip);
        let mut ctx = TaskCtx {
            eqpt: &mut eqpt,
            arm: &mut arm,
            ops: &ops
        };

        let cycles = run_move(&mut task, &mut ctx, &handles, 500)
            .unwrap_or(u32::MAX);

        // Full travel at full drive would take 0.45 / SIM_FLIP_RATE seconds
        let full_rate_cycles = (0.45 / SIM_FLIP_RATE / 0.02) as u32;
        assert!(cycles < full_rate_cycles * 5);
    }
}
