//! Shared helpers for the executable's unit tests.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::cell::RefCell;
use std::rc::Rc;

// Internal
use crate::arm_ctrl::ArmCtrl;
use crate::data_store::OperatorInputs;
use crate::eqpt::sim::{sim_equipment, SimHandles};
use crate::eqpt::Equipment;
use crate::exec::{ResourceSet, Task, TaskCtx};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the pieces of a task context around simulated equipment.
///
/// The arm controller uses default parameters and has its side resolved
/// from the given starting position.
pub(crate) fn test_ctx_parts(
    initial_pot: f64
) -> (Equipment, SimHandles, ArmCtrl, OperatorInputs) {
    let (eqpt, handles) = sim_equipment(initial_pot);

    let mut arm = ArmCtrl::default();
    arm.resolve_side(initial_pot);

    (eqpt, handles, arm, OperatorInputs::default())
}

// ---------------------------------------------------------------------------
// TEST TASKS
// ---------------------------------------------------------------------------

/// A task which records its lifecycle calls into a shared log and finishes
/// after a fixed number of steps.
pub(crate) struct CountingTask {
    name: &'static str,
    resources: ResourceSet,
    cycles: u64,
    steps: u64,
    log: Rc<RefCell<Vec<String>>>,
}

impl CountingTask {
    pub(crate) fn new(
        name: &'static str,
        resources: ResourceSet,
        cycles: u64,
        log: Rc<RefCell<Vec<String>>>,
    ) -> Self {
        Self {
            name,
            resources,
            cycles,
            steps: 0,
            log,
        }
    }

    fn record(&self, event: &str) {
        self.log.borrow_mut().push(format!("{}:{}", self.name, event));
    }
}

impl Task for CountingTask {
    fn name(&self) -> &str {
        self.name
    }

    fn resources(&self) -> ResourceSet {
        self.resources
    }

    fn start(&mut self, _ctx: &mut TaskCtx) {
        self.record("start");
    }

    fn step(&mut self, _ctx: &mut TaskCtx) {
        self.steps += 1;
        self.record("step");
    }

    fn is_finished(&mut self, _ctx: &mut TaskCtx) -> bool {
        self.steps >= self.cycles
    }

    fn end(&mut self, _ctx: &mut TaskCtx, interrupted: bool) {
        if interrupted {
            self.record("end_interrupted");
        } else {
            self.record("end");
        }
    }
}
