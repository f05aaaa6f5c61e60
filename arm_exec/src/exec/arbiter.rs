//! # Resource arbiter
//!
//! Tracks which task owns which resource. Arbitration is last-writer-wins:
//! a new claim always succeeds and any task which loses a resource to it is
//! reported back so the executive can interrupt it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::task::{Resource, ResourceSet, NUM_RESOURCES};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Identifies a task registered with the executive.
pub type TaskId = u64;

/// Ownership table mapping each resource to at most one task.
#[derive(Default)]
pub struct ResourceArbiter {
    owners: [Option<TaskId>; NUM_RESOURCES],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ResourceArbiter {
    /// Grant the given resources to the given task.
    ///
    /// Returns the ids of the tasks which lost a resource as a result, with
    /// no duplicates. The claim itself never fails.
    pub fn claim(
        &mut self,
        task: TaskId,
        resources: ResourceSet
    ) -> Vec<TaskId> {
        let mut preempted = Vec::new();

        for r in Resource::all().iter() {
            if !resources.contains(*r) {
                continue;
            }

            if let Some(owner) = self.owners[r.index()] {
                if owner != task && !preempted.contains(&owner) {
                    preempted.push(owner);
                }
            }

            self.owners[r.index()] = Some(task);
        }

        preempted
    }

    /// Release every resource owned by the given task.
    pub fn release(&mut self, task: TaskId) {
        for owner in self.owners.iter_mut() {
            if *owner == Some(task) {
                *owner = None;
            }
        }
    }

    /// Get the current owner of a resource.
    pub fn owner(&self, resource: Resource) -> Option<TaskId> {
        self.owners[resource.index()]
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_claim_and_release() {
        let mut arb = ResourceArbiter::default();

        let preempted = arb.claim(
            1, ResourceSet::of(&[Resource::Flipper, Resource::Rollers])
        );
        assert!(preempted.is_empty());
        assert_eq!(arb.owner(Resource::Flipper), Some(1));
        assert_eq!(arb.owner(Resource::Rollers), Some(1));
        assert_eq!(arb.owner(Resource::Beak), None);

        arb.release(1);
        assert_eq!(arb.owner(Resource::Flipper), None);
        assert_eq!(arb.owner(Resource::Rollers), None);
    }

    #[test]
    fn test_last_writer_wins() {
        let mut arb = ResourceArbiter::default();

        arb.claim(1, ResourceSet::of(&[Resource::Flipper, Resource::Rollers]));
        arb.claim(2, ResourceSet::of(&[Resource::Beak]));

        // Task 3 takes the rollers from task 1, which is reported exactly
        // once even though only one of its resources was lost
        let preempted = arb.claim(
            3, ResourceSet::of(&[Resource::Rollers, Resource::IntakeArms])
        );
        assert_eq!(preempted, vec![1]);

        assert_eq!(arb.owner(Resource::Flipper), Some(1));
        assert_eq!(arb.owner(Resource::Rollers), Some(3));
        assert_eq!(arb.owner(Resource::Beak), Some(2));
        assert_eq!(arb.owner(Resource::IntakeArms), Some(3));
    }

    #[test]
    fn test_reclaim_by_same_task_not_reported() {
        let mut arb = ResourceArbiter::default();

        arb.claim(1, ResourceSet::of(&[Resource::Flipper]));
        let preempted = arb.claim(1, ResourceSet::of(&[Resource::Flipper]));
        assert!(preempted.is_empty());
    }
}
