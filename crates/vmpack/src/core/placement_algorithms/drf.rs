//! Dominant resource fairness placement.

use std::collections::BTreeSet;

use crate::core::assignment::PlacementAssignment;
use crate::core::common::{Allocation, AllocationVerdict};
use crate::core::placement_algorithm::{PlacementAlgorithm, PlacementOutcome};
use crate::core::resource_pool::ResourcePoolState;
use crate::core::resources::{ResourceVector, RESOURCE_COUNT};
use crate::core::scenario::Scenario;
use crate::core::solver::SolverError;

/// Host choice rule applied once the fairest VM is picked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostSelection {
    /// First feasible host in id order.
    FirstFit,
    /// Feasible host whose post-placement residuals, normalized by original
    /// capacity, have the smallest Euclidean norm.
    BestFitL2,
    /// Blends the dominant share with resource scarcity weights when ranking
    /// VMs, and picks the feasible host with the smallest bottleneck
    /// (maximum per-resource) utilization after the placement.
    ScarcityBottleneck { alpha: f64 },
}

/// Iterative fairness-driven placement.
///
/// Each iteration ranks the still unplaced VMs by dominant share against the
/// per-resource maximum remaining capacity across hosts, places the smallest
/// one on a host chosen by the [HostSelection] rule, and repeats. A VM with
/// no feasible host is dropped from further consideration. The loop stops
/// early when some resource is exhausted on every host.
pub struct DominantResourceFairness {
    selection: HostSelection,
    epsilon: f64,
}

impl DominantResourceFairness {
    pub fn new(selection: HostSelection, epsilon: f64) -> Self {
        Self { selection, epsilon }
    }

    /// Largest demand-to-availability ratio over the four resources.
    fn dominant_share(demand: &ResourceVector, max_remaining: &ResourceVector) -> f64 {
        demand.div(max_remaining).max_component()
    }

    /// VM ranking score; for the scarcity rule the dominant share is blended
    /// with scarcity-weighted normalized demand.
    fn vm_score(&self, demand: &ResourceVector, max_remaining: &ResourceVector, pool: &ResourcePoolState) -> f64 {
        let share = Self::dominant_share(demand, max_remaining);
        match self.selection {
            HostSelection::FirstFit | HostSelection::BestFitL2 => share,
            HostSelection::ScarcityBottleneck { alpha } => {
                let remaining_frac = pool.avg_remaining_fraction().as_array();
                let avg_used = pool.avg_used().as_array();
                let demand = demand.as_array();
                let mut weighted = 0.;
                for r in 0..RESOURCE_COUNT {
                    let scarcity = 1. / (self.epsilon + remaining_frac[r]);
                    let normalized = demand[r] / avg_used[r].max(self.epsilon);
                    weighted += scarcity * normalized;
                }
                alpha * share + (1. - alpha) * weighted
            }
        }
    }

    fn select_host(&self, alloc: &Allocation, pool: &ResourcePoolState) -> Option<u32> {
        match self.selection {
            HostSelection::FirstFit => pool
                .get_hosts_list()
                .into_iter()
                .find(|&host| pool.can_allocate(alloc, host) == AllocationVerdict::Success),
            HostSelection::BestFitL2 => {
                let mut result = None;
                let mut best_norm = f64::MAX;
                for host in pool.get_hosts_list() {
                    if pool.can_allocate(alloc, host) != AllocationVerdict::Success {
                        continue;
                    }
                    let residual = (pool.remaining(host) - alloc.demand).div(&pool.capacity(host));
                    let norm = residual
                        .as_array()
                        .iter()
                        .map(|v| v * v)
                        .sum::<f64>()
                        .sqrt();
                    if norm < best_norm {
                        best_norm = norm;
                        result = Some(host);
                    }
                }
                result
            }
            HostSelection::ScarcityBottleneck { .. } => {
                let mut result = None;
                let mut best_bottleneck = f64::MAX;
                for host in pool.get_hosts_list() {
                    if pool.can_allocate(alloc, host) != AllocationVerdict::Success {
                        continue;
                    }
                    let used = pool.used(host) + alloc.demand;
                    let bottleneck = used.div(&pool.capacity(host)).max_component();
                    if bottleneck < best_bottleneck {
                        best_bottleneck = bottleneck;
                        result = Some(host);
                    }
                }
                result
            }
        }
    }
}

impl PlacementAlgorithm for DominantResourceFairness {
    fn place(&self, scenario: &Scenario, num_vms: u32) -> Result<PlacementOutcome, SolverError> {
        let mut pool = ResourcePoolState::from_scenario(scenario);
        let mut assignment = PlacementAssignment::new(num_vms);
        let mut unallocated: BTreeSet<u32> = (0..num_vms).collect();
        let mut hit_iteration_cap = false;

        // The set shrinks every iteration, the cap is a safety bound only.
        let iteration_cap = 2 * num_vms;
        let mut iterations = 0;
        while !unallocated.is_empty() {
            if iterations >= iteration_cap {
                hit_iteration_cap = true;
                break;
            }
            iterations += 1;

            let max_remaining = pool.max_remaining();
            if !max_remaining.is_strictly_positive() {
                break;
            }

            let mut selected = None;
            let mut best_score = f64::MAX;
            for &vm in &unallocated {
                let score = self.vm_score(&scenario.vm_pool[vm as usize], &max_remaining, &pool);
                if score < best_score {
                    best_score = score;
                    selected = Some(vm);
                }
            }
            let vm = match selected {
                Some(vm) => vm,
                None => break,
            };
            unallocated.remove(&vm);

            let alloc = scenario.allocation(vm);
            if let Some(host) = self.select_host(&alloc, &pool) {
                pool.allocate(&alloc, host);
                assignment.assign(vm, host);
            }
        }

        let mut outcome = PlacementOutcome::new(assignment);
        outcome.hit_iteration_cap = hit_iteration_cap;
        Ok(outcome)
    }
}
