//! # Task executive
//!
//! Cooperative scheduler running inside the cyclic executive. Tasks are
//! requested at any time, granted their resources at the next tick, stepped
//! once per tick while they run, and torn down exactly once when they
//! finish or are preempted.
//!
//! Each tick runs a fixed sequence of phases:
//!
//! 1. Trigger evaluation, spawning tasks on switch rising edges
//! 2. Resource claims for newly requested tasks, interrupting any task
//!    which loses a resource before the new owner starts
//! 3. Default task fallback for unowned resources
//! 4. Execution of every running task
//! 5. Finish evaluation
//! 6. Cleanup of finished tasks
//!
//! Interrupted tasks are cleaned up inside phase 2, before the preempting
//! task starts, so two tasks never drive the same actuator in one tick.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arbiter;
pub mod chain;
pub mod task;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};

// Internal
use crate::eqpt::SwitchId;
pub use arbiter::{ResourceArbiter, TaskId};
pub use chain::TaskChain;
pub use task::{
    InstantAction, Resource, ResourceSet, Task, TaskCtx, TaskState, Wait};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Factory producing a fresh task instance on demand.
pub type TaskFactory = Box<dyn Fn() -> Box<dyn Task>>;

/// The task executive.
pub struct Executive {
    slots: Vec<Slot>,
    arbiter: ResourceArbiter,
    triggers: Vec<Trigger>,
    defaults: Vec<(Resource, TaskFactory)>,
    next_id: TaskId,
    num_ticks: u64,
}

/// A registered task and its lifecycle state.
struct Slot {
    id: TaskId,
    task: Box<dyn Task>,
    state: TaskState,
}

/// A switch-driven task spawn.
struct Trigger {
    switch: SwitchId,
    last_active: bool,
    factory: TaskFactory,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Executive {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            arbiter: ResourceArbiter::default(),
            triggers: Vec::new(),
            defaults: Vec::new(),
            next_id: 0,
            num_ticks: 0,
        }
    }
}

impl Executive {
    /// Register a task to be granted its resources at the next tick.
    pub fn request(&mut self, task: Box<dyn Task>) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;

        info!("Task requested: {} (id {})", task.name(), id);
        self.slots.push(Slot {
            id,
            task,
            state: TaskState::Idle,
        });

        id
    }

    /// Spawn a fresh instance of a task whenever the given switch sees a
    /// rising edge.
    pub fn bind_trigger(&mut self, switch: SwitchId, factory: TaskFactory) {
        self.triggers.push(Trigger {
            switch,
            last_active: false,
            factory,
        });
    }

    /// Register the default task for a resource.
    ///
    /// Whenever the resource is unowned at the start of a tick a fresh
    /// default instance is spawned and started in the same tick, so the
    /// resource's actuator is never left undriven.
    pub fn set_default(&mut self, resource: Resource, factory: TaskFactory) {
        self.defaults.push((resource, factory));
    }

    /// Run one tick of the executive.
    pub fn tick(&mut self, ctx: &mut TaskCtx) {
        self.num_ticks += 1;

        // Phase 1: trigger evaluation on switch rising edges
        let mut spawned: Vec<Box<dyn Task>> = Vec::new();
        for trigger in self.triggers.iter_mut() {
            let active = ctx.eqpt.read_switch(trigger.switch);
            if active && !trigger.last_active {
                spawned.push((trigger.factory)());
            }
            trigger.last_active = active;
        }
        for task in spawned {
            self.request(task);
        }

        // Phase 2: resource claims, in request order
        let idle_ids: Vec<TaskId> = self
            .slots
            .iter()
            .filter(|s| s.state == TaskState::Idle)
            .map(|s| s.id)
            .collect();
        for id in idle_ids {
            self.grant(id, ctx);
        }

        // Phase 3: default task fallback for unowned resources
        for i in 0..self.defaults.len() {
            let resource = self.defaults[i].0;
            if self.arbiter.owner(resource).is_none() {
                let task = (self.defaults[i].1)();
                let id = self.request(task);
                self.grant(id, ctx);
            }
        }

        // Phase 4: execute every running task
        for i in 0..self.slots.len() {
            if self.slots[i].state == TaskState::Running {
                self.slots[i].task.step(ctx);
            }
        }

        // Phase 5: finish evaluation
        for i in 0..self.slots.len() {
            if self.slots[i].state == TaskState::Running
                && self.slots[i].task.is_finished(ctx)
            {
                self.slots[i].state = TaskState::Finished;
            }
        }

        // Phase 6: cleanup of finished tasks
        let mut i = 0;
        while i < self.slots.len() {
            if self.slots[i].state == TaskState::Finished {
                let mut slot = self.slots.remove(i);
                info!("Task finished: {} (id {})", slot.task.name(), slot.id);
                slot.task.end(ctx, false);
                self.arbiter.release(slot.id);
            } else {
                i += 1;
            }
        }
    }

    /// Interrupt every task, releasing all resources.
    ///
    /// Used when entering safe mode: every task's `end` runs with
    /// `interrupted = true`, so all cleanup writes happen before the caller
    /// zeroes the actuators.
    pub fn abort_all(&mut self, ctx: &mut TaskCtx) {
        if !self.slots.is_empty() {
            warn!("Aborting all {} tasks", self.slots.len());
        }

        while let Some(mut slot) = self.slots.pop() {
            if slot.state == TaskState::Running {
                slot.task.end(ctx, true);
            }
            self.arbiter.release(slot.id);
        }
    }

    /// Get the current owner of a resource.
    pub fn owner(&self, resource: Resource) -> Option<TaskId> {
        self.arbiter.owner(resource)
    }

    /// Number of tasks currently registered, running or not.
    pub fn num_tasks(&self) -> usize {
        self.slots.len()
    }

    /// Number of ticks executed so far.
    pub fn num_ticks(&self) -> u64 {
        self.num_ticks
    }

    /// Grant a requested task its resources and start it.
    ///
    /// Any task which loses a resource to the claim is interrupted here,
    /// before the new owner's `start` runs.
    fn grant(&mut self, id: TaskId, ctx: &mut TaskCtx) {
        let resources = match self.slots.iter().find(|s| s.id == id) {
            Some(slot) => slot.task.resources(),
            None => return,
        };

        let preempted = self.arbiter.claim(id, resources);
        for pid in preempted {
            self.interrupt(pid, ctx);
        }

        if let Some(slot) = self.slots.iter_mut().find(|s| s.id == id) {
            info!("Task started: {} (id {})", slot.task.name(), slot.id);
            slot.task.start(ctx);
            slot.state = TaskState::Running;
        }
    }

    /// Interrupt a single task, running its cleanup and removing it.
    fn interrupt(&mut self, id: TaskId, ctx: &mut TaskCtx) {
        if let Some(pos) = self.slots.iter().position(|s| s.id == id) {
            let mut slot = self.slots.remove(pos);
            warn!("Task interrupted: {} (id {})", slot.task.name(), slot.id);
            slot.state = TaskState::Interrupted;
            slot.task.end(ctx, true);
            self.arbiter.release(id);
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
