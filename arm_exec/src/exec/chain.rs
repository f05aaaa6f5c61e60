//! # Task chains
//!
//! A chain strings tasks together to run one after another. The chain is
//! itself a task: it claims the union of its steps' resources for its whole
//! lifetime, so a preemption anywhere in the chain tears the whole chain
//! down rather than leaving the mechanisms mid-sequence.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::task::{ResourceSet, Task, TaskCtx};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A sequence of tasks executed one at a time.
pub struct TaskChain {
    name: &'static str,
    steps: Vec<Box<dyn Task>>,
    resources: ResourceSet,

    /// Index of the step currently executing.
    cursor: usize,

    /// True once the current step's `start` has been called.
    step_started: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TaskChain {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
            resources: ResourceSet::EMPTY,
            cursor: 0,
            step_started: false,
        }
    }

    /// Append a step to the chain, builder style.
    pub fn then(mut self, step: Box<dyn Task>) -> Self {
        self.resources = self.resources.union(step.resources());
        self.steps.push(step);
        self
    }
}

impl Task for TaskChain {
    fn name(&self) -> &str {
        self.name
    }

    fn resources(&self) -> ResourceSet {
        self.resources
    }

    fn start(&mut self, _ctx: &mut TaskCtx) {
        self.cursor = 0;
        self.step_started = false;
    }

    /// Run one cycle of the current step.
    ///
    /// A step is started lazily on the first cycle it executes, and the
    /// chain advances only when the step reports itself finished, so a step
    /// never sees a `step` call after its `end`.
    fn step(&mut self, ctx: &mut TaskCtx) {
        let step = match self.steps.get_mut(self.cursor) {
            Some(s) => s,
            None => return
        };

        if !self.step_started {
            step.start(ctx);
            self.step_started = true;
        }

        step.step(ctx);

        if step.is_finished(ctx) {
            step.end(ctx, false);
            self.cursor += 1;
            self.step_started = false;
        }
    }

    fn is_finished(&mut self, _ctx: &mut TaskCtx) -> bool {
        self.cursor >= self.steps.len()
    }

    /// Tear down the chain.
    ///
    /// If a step is mid-execution it is ended as interrupted regardless of
    /// why the chain itself is ending.
    fn end(&mut self, ctx: &mut TaskCtx, _interrupted: bool) {
        if self.step_started {
            if let Some(step) = self.steps.get_mut(self.cursor) {
                step.end(ctx, true);
            }
            self.step_started = false;
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::exec::task::Resource;
    use crate::test_util::{test_ctx_parts, CountingTask};

    #[test]
    fn test_union_resources() {
        let log = Rc::new(RefCell::new(Vec::new()));

        let chain = TaskChain::new("chain")
            .then(Box::new(CountingTask::new(
                "a", ResourceSet::of(&[Resource::Beak]), 1, log.clone()
            )))
            .then(Box::new(CountingTask::new(
                "b", ResourceSet::of(&[Resource::Rollers]), 1, log.clone()
            )));

        assert!(chain.resources().contains(Resource::Beak));
        assert!(chain.resources().contains(Resource::Rollers));
        assert!(!chain.resources().contains(Resource::Flipper));
    }

    #[test]
    fn test_steps_run_in_sequence() {
        let log = Rc::new(RefCell::new(Vec::new()));

        let mut chain = TaskChain::new("chain")
            .then(Box::new(CountingTask::new(
                "a", ResourceSet::EMPTY, 2, log.clone()
            )))
            .then(Box::new(CountingTask::new(
                "b", ResourceSet::EMPTY, 1, log.clone()
            )));

        let (mut eqpt, _handles, mut arm, ops) = test_ctx_parts(0.8);
        let mut ctx = TaskCtx {
            eqpt: &mut eqpt,
            arm: &mut arm,
            ops: &ops
        };

        chain.start(&mut ctx);

        // Step a needs two cycles, step b one, so the chain takes three
        for _ in 0..2 {
            assert!(!chain.is_finished(&mut ctx));
            chain.step(&mut ctx);
        }
        assert!(!chain.is_finished(&mut ctx));
        chain.step(&mut ctx);
        assert!(chain.is_finished(&mut ctx));

        assert_eq!(
            *log.borrow(),
            vec![
                "a:start", "a:step", "a:step", "a:end",
                "b:start", "b:step", "b:end",
            ]
        );
    }

    #[test]
    fn test_stuck_step_blocks_advance() {
        let log = Rc::new(RefCell::new(Vec::new()));

        let mut chain = TaskChain::new("chain")
            .then(Box::new(CountingTask::new(
                "a", ResourceSet::EMPTY, 1, log.clone()
            )))
            .then(Box::new(CountingTask::new(
                "b", ResourceSet::EMPTY, u64::MAX, log.clone()
            )))
            .then(Box::new(CountingTask::new(
                "c", ResourceSet::EMPTY, 1, log.clone()
            )));

        let (mut eqpt, _handles, mut arm, ops) = test_ctx_parts(0.8);
        let mut ctx = TaskCtx {
            eqpt: &mut eqpt,
            arm: &mut arm,
            ops: &ops
        };

        chain.start(&mut ctx);
        for _ in 0..50 {
            chain.step(&mut ctx);
        }

        // The chain is stuck at b: a ended exactly once, c never started
        assert!(!chain.is_finished(&mut ctx));
        assert_eq!(
            log.borrow().iter().filter(|e| *e == "a:end").count(),
            1
        );
        assert!(!log.borrow().iter().any(|e| e.starts_with("c")));
        assert!(log.borrow().contains(&"b:step".to_string()));
    }

    #[test]
    fn test_interrupt_ends_active_step() {
        let log = Rc::new(RefCell::new(Vec::new()));

        let mut chain = TaskChain::new("chain")
            .then(Box::new(CountingTask::new(
                "a", ResourceSet::EMPTY, 10, log.clone()
            )))
            .then(Box::new(CountingTask::new(
                "b", ResourceSet::EMPTY, 1, log.clone()
            )));

        let (mut eqpt, _handles, mut arm, ops) = test_ctx_parts(0.8);
        let mut ctx = TaskCtx {
            eqpt: &mut eqpt,
            arm: &mut arm,
            ops: &ops
        };

        chain.start(&mut ctx);
        chain.step(&mut ctx);
        chain.end(&mut ctx, true);

        // The step mid-execution was interrupted, the later step never ran
        assert_eq!(
            *log.borrow(),
            vec!["a:start", "a:step", "a:end_interrupted"]
        );
    }
}
