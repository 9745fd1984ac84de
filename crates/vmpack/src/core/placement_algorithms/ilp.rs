//! Exact assignment via integer programming.

use std::time::Duration;

use crate::core::assignment::PlacementAssignment;
use crate::core::common::AllocationVerdict;
use crate::core::placement_algorithm::{PlacementAlgorithm, PlacementOutcome};
use crate::core::placement_algorithms::lp_rounding::{LpRounding, RepairStrategy};
use crate::core::resource_pool::ResourcePoolState;
use crate::core::scenario::Scenario;
use crate::core::solver::{AssignmentProblem, SolverError};

/// Solves the binary assignment problem for the maximum number of placed
/// VMs. If the solver produces no solution within the time budget, the
/// run falls back to [LpRounding] with the most-full repair strategy and
/// the outcome is flagged accordingly.
pub struct ExactAssignment {
    budget: Duration,
}

impl ExactAssignment {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }
}

impl PlacementAlgorithm for ExactAssignment {
    fn place(&self, scenario: &Scenario, num_vms: u32) -> Result<PlacementOutcome, SolverError> {
        let num_hosts = scenario.num_hosts();
        let demands: Vec<_> = (0..num_vms).map(|vm| scenario.vm_pool[vm as usize]).collect();
        let problem = AssignmentProblem::new(scenario.hosts.clone(), demands, true);
        let solution = match problem.solve(Some(self.budget))? {
            Some(solution) => solution,
            None => {
                let mut outcome = LpRounding::new(RepairStrategy::MostFull).place(scenario, num_vms)?;
                outcome.fell_back = true;
                return Ok(outcome);
            }
        };

        let mut pool = ResourcePoolState::from_scenario(scenario);
        let mut assignment = PlacementAssignment::new(num_vms);
        for host in 0..num_hosts {
            for vm in 0..num_vms as usize {
                if solution[host * num_vms as usize + vm] >= 0.5 && assignment.host_of(vm as u32).is_none() {
                    let alloc = scenario.allocation(vm as u32);
                    if pool.can_allocate(&alloc, host as u32) == AllocationVerdict::Success {
                        pool.allocate(&alloc, host as u32);
                        assignment.assign(vm as u32, host as u32);
                    }
                }
            }
        }
        Ok(PlacementOutcome::new(assignment))
    }
}
