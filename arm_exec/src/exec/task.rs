//! # Task model
//!
//! A task is the unit of schedulable work: it declares the resources it
//! needs, runs one step per cycle while it owns them, and is torn down
//! exactly once whether it finishes or is preempted.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::arm_ctrl::ArmCtrl;
use crate::data_store::OperatorInputs;
use crate::eqpt::Equipment;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of arbitrated resources.
pub const NUM_RESOURCES: usize = 4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskState {
    /// Created but not yet granted its resources.
    Idle,

    /// Owns its resources and is stepped every cycle.
    Running,

    /// Finish predicate held, terminal.
    Finished,

    /// Preempted by a competing resource claim, terminal.
    Interrupted,
}

/// A logical device group which at most one task may drive at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// The flipper arm's motor and potentiometer
    Flipper,

    /// The manipulator's intake roller motor and gamepiece switch
    Rollers,

    /// The manipulator's beak piston
    Beak,

    /// The manipulator's arms piston
    IntakeArms,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A set of resources, used for task declarations and ownership queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceSet(u8);

/// Everything a task may touch while it runs.
///
/// Built fresh by the executive each cycle from the executable's state, so
/// tasks never hold references between cycles.
pub struct TaskCtx<'a> {
    pub eqpt: &'a mut Equipment,
    pub arm: &'a mut ArmCtrl,
    pub ops: &'a OperatorInputs,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A schedulable unit of work.
///
/// The executive calls `start` once when the task is granted its resources,
/// `step` once per cycle while it runs, `is_finished` after each step, and
/// `end` exactly once when the task leaves the running state, with
/// `interrupted` telling it whether it was preempted or finished cleanly.
pub trait Task {
    /// Human readable name, used in logs.
    fn name(&self) -> &str;

    /// The resources this task must own to run.
    fn resources(&self) -> ResourceSet;

    /// Called once when the task is granted its resources.
    fn start(&mut self, _ctx: &mut TaskCtx) {}

    /// Called once per cycle while the task is running.
    fn step(&mut self, _ctx: &mut TaskCtx) {}

    /// Finish predicate, evaluated after each cycle's step.
    fn is_finished(&mut self, ctx: &mut TaskCtx) -> bool;

    /// Cleanup hook, called exactly once on leaving the running state.
    fn end(&mut self, _ctx: &mut TaskCtx, _interrupted: bool) {}
}

// ---------------------------------------------------------------------------
// GENERIC TASKS
// ---------------------------------------------------------------------------

/// A task which performs a single action when started and immediately
/// finishes.
pub struct InstantAction {
    name: &'static str,
    resources: ResourceSet,
    action: Box<dyn FnMut(&mut TaskCtx)>,
}

/// A task which does nothing for a fixed number of cycles.
pub struct Wait {
    cycles: u64,
    elapsed: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Resource {
    /// Index of this resource in ownership tables.
    pub fn index(&self) -> usize {
        match self {
            Resource::Flipper => 0,
            Resource::Rollers => 1,
            Resource::Beak => 2,
            Resource::IntakeArms => 3,
        }
    }

    /// All arbitrated resources.
    pub fn all() -> [Resource; NUM_RESOURCES] {
        [
            Resource::Flipper,
            Resource::Rollers,
            Resource::Beak,
            Resource::IntakeArms,
        ]
    }
}

impl ResourceSet {
    /// The empty set.
    pub const EMPTY: ResourceSet = ResourceSet(0);

    /// Build a set from a slice of resources.
    pub fn of(resources: &[Resource]) -> Self {
        let mut set = ResourceSet::EMPTY;
        for r in resources {
            set.insert(*r);
        }
        set
    }

    pub fn insert(&mut self, resource: Resource) {
        self.0 |= 1 << resource.index();
    }

    pub fn contains(&self, resource: Resource) -> bool {
        self.0 & (1 << resource.index()) != 0
    }

    pub fn intersects(&self, other: ResourceSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(&self, other: ResourceSet) -> ResourceSet {
        ResourceSet(self.0 | other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl InstantAction {
    pub fn new(
        name: &'static str,
        resources: ResourceSet,
        action: impl FnMut(&mut TaskCtx) + 'static
    ) -> Self {
        Self {
            name,
            resources,
            action: Box::new(action),
        }
    }
}

impl Task for InstantAction {
    fn name(&self) -> &str {
        self.name
    }

    fn resources(&self) -> ResourceSet {
        self.resources
    }

    fn start(&mut self, ctx: &mut TaskCtx) {
        (self.action)(ctx);
    }

    fn is_finished(&mut self, _ctx: &mut TaskCtx) -> bool {
        true
    }
}

impl Wait {
    pub fn new(cycles: u64) -> Self {
        Self { cycles, elapsed: 0 }
    }
}

impl Task for Wait {
    fn name(&self) -> &str {
        "Wait"
    }

    fn resources(&self) -> ResourceSet {
        ResourceSet::EMPTY
    }

    fn step(&mut self, _ctx: &mut TaskCtx) {
        self.elapsed += 1;
    }

    fn is_finished(&mut self, _ctx: &mut TaskCtx) -> bool {
        self.elapsed >= self.cycles
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_resource_set() {
        let set = ResourceSet::of(&[Resource::Flipper, Resource::Beak]);

        assert!(set.contains(Resource::Flipper));
        assert!(set.contains(Resource::Beak));
        assert!(!set.contains(Resource::Rollers));

        assert!(set.intersects(ResourceSet::of(&[Resource::Beak])));
        assert!(!set.intersects(ResourceSet::of(&[Resource::Rollers])));
        assert!(!set.intersects(ResourceSet::EMPTY));

        let union = set.union(ResourceSet::of(&[Resource::Rollers]));
        assert!(union.contains(Resource::Rollers));
        assert!(union.contains(Resource::Flipper));

        assert!(ResourceSet::EMPTY.is_empty());
        assert!(!set.is_empty());
    }
}
