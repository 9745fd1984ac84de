//! Linear relaxation with rounding repair.

use crate::core::assignment::PlacementAssignment;
use crate::core::common::AllocationVerdict;
use crate::core::placement_algorithm::{PlacementAlgorithm, PlacementOutcome};
use crate::core::resource_pool::ResourcePoolState;
use crate::core::scenario::Scenario;
use crate::core::solver::{AssignmentProblem, SolverError};

/// How phase two places the VMs whose fractional values did not round up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RepairStrategy {
    /// Try hosts from most loaded to least loaded.
    MostFull,
    /// Try hosts in id order.
    FirstFit,
}

#[derive(Clone, Copy)]
struct ScoredCandidate {
    vm: u32,
    host: u32,
    value: f64,
}

/// Solves the continuous relaxation of the assignment problem, then rounds
/// the fractional solution into an actual placement in two phases.
///
/// Phase one walks the positive (host, vm) entries in descending value order
/// and places a VM on its candidate host when the value exceeds one half and
/// the host still fits it. Phase two takes the VMs left over, again in
/// descending value order of their remaining candidates, and packs each on
/// the first feasible host under the repair strategy. A VM whose variables
/// are all zero in the relaxation is never placed.
pub struct LpRounding {
    repair: RepairStrategy,
}

impl LpRounding {
    pub fn new(repair: RepairStrategy) -> Self {
        Self { repair }
    }

    fn candidates(solution: &[f64], num_hosts: usize, num_vms: usize) -> Vec<ScoredCandidate> {
        let mut candidates = Vec::new();
        for host in 0..num_hosts {
            for vm in 0..num_vms {
                let value = solution[host * num_vms + vm];
                if value > 0. {
                    candidates.push(ScoredCandidate {
                        vm: vm as u32,
                        host: host as u32,
                        value,
                    });
                }
            }
        }
        candidates.sort_by(|a, b| b.value.total_cmp(&a.value));
        candidates
    }

    fn repair_hosts(&self, pool: &ResourcePoolState) -> Vec<u32> {
        let mut hosts = pool.get_hosts_list();
        if self.repair == RepairStrategy::MostFull {
            hosts.sort_by(|a, b| pool.average_load(*b).total_cmp(&pool.average_load(*a)));
        }
        hosts
    }
}

impl PlacementAlgorithm for LpRounding {
    fn place(&self, scenario: &Scenario, num_vms: u32) -> Result<PlacementOutcome, SolverError> {
        let num_hosts = scenario.num_hosts();
        let demands: Vec<_> = (0..num_vms).map(|vm| scenario.vm_pool[vm as usize]).collect();
        let problem = AssignmentProblem::new(scenario.hosts.clone(), demands, false);
        let solution = match problem.solve(None)? {
            Some(solution) => solution,
            None => return Ok(PlacementOutcome::new(PlacementAssignment::new(num_vms))),
        };

        let mut pool = ResourcePoolState::from_scenario(scenario);
        let mut assignment = PlacementAssignment::new(num_vms);
        let candidates = Self::candidates(&solution, num_hosts, num_vms as usize);

        for c in &candidates {
            if c.value <= 0.5 || assignment.host_of(c.vm).is_some() {
                continue;
            }
            let alloc = scenario.allocation(c.vm);
            if pool.can_allocate(&alloc, c.host) == AllocationVerdict::Success {
                pool.allocate(&alloc, c.host);
                assignment.assign(c.vm, c.host);
            }
        }

        for c in &candidates {
            if assignment.host_of(c.vm).is_some() {
                continue;
            }
            let alloc = scenario.allocation(c.vm);
            for host in self.repair_hosts(&pool) {
                if pool.can_allocate(&alloc, host) == AllocationVerdict::Success {
                    pool.allocate(&alloc, host);
                    assignment.assign(c.vm, host);
                    break;
                }
            }
        }

        Ok(PlacementOutcome::new(assignment))
    }
}
