//! Trait for VM placement algorithms.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::assignment::PlacementAssignment;
use crate::core::common::{Allocation, AllocationVerdict};
use crate::core::placement_algorithms::drf::{DominantResourceFairness, HostSelection};
use crate::core::placement_algorithms::first_fit::FirstFit;
use crate::core::placement_algorithms::ilp::ExactAssignment;
use crate::core::placement_algorithms::least_full::LeastFull;
use crate::core::placement_algorithms::lp_rounding::{LpRounding, RepairStrategy};
use crate::core::placement_algorithms::most_full::MostFull;
use crate::core::placement_algorithms::random::RandomHost;
use crate::core::resource_pool::ResourcePoolState;
use crate::core::scenario::Scenario;
use crate::core::solver::SolverError;

/// Assignment plus the flags recorded while producing it.
pub struct PlacementOutcome {
    pub assignment: PlacementAssignment,
    /// The exact solver produced no solution and a heuristic answered instead.
    pub fell_back: bool,
    /// The fairness loop stopped on its iteration bound (safety only, the
    /// loop shrinks its work set every iteration).
    pub hit_iteration_cap: bool,
}

impl PlacementOutcome {
    pub fn new(assignment: PlacementAssignment) -> Self {
        Self {
            assignment,
            fell_back: false,
            hit_iteration_cap: false,
        }
    }
}

/// Places the first `num_vms` VMs of the scenario pool onto its hosts.
pub trait PlacementAlgorithm {
    fn place(&self, scenario: &Scenario, num_vms: u32) -> Result<PlacementOutcome, SolverError>;
}

/// Host choice rule used by the greedy algorithms. Called once per VM with
/// the current pool state, returns the chosen feasible host if one exists.
pub trait HostSelector {
    fn select_host(&mut self, alloc: &Allocation, pool: &ResourcePoolState) -> Option<u32>;
}

/// Sequential placement driver shared by the greedy algorithms: VMs are
/// processed in pool order, each placed on the host the selector picks.
pub struct GreedyPacker<S: HostSelector + Clone> {
    selector: S,
}

impl<S: HostSelector + Clone> GreedyPacker<S> {
    pub fn new(selector: S) -> Self {
        Self { selector }
    }
}

impl<S: HostSelector + Clone> PlacementAlgorithm for GreedyPacker<S> {
    fn place(&self, scenario: &Scenario, num_vms: u32) -> Result<PlacementOutcome, SolverError> {
        let mut pool = ResourcePoolState::from_scenario(scenario);
        let mut assignment = PlacementAssignment::new(num_vms);
        let mut selector = self.selector.clone();
        for vm_id in 0..num_vms {
            let alloc = scenario.allocation(vm_id);
            if let Some(host_id) = selector.select_host(&alloc, &pool) {
                debug_assert!(pool.can_allocate(&alloc, host_id) == AllocationVerdict::Success);
                pool.allocate(&alloc, host_id);
                assignment.assign(vm_id, host_id);
            }
        }
        Ok(PlacementOutcome::new(assignment))
    }
}

/// Identifies one algorithm configuration in configs and reports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AlgorithmKind {
    Ilp,
    LpRoundingMostFull,
    LpRoundingFirstFit,
    FirstFit,
    MostFull,
    LeastFull,
    Random,
    DrfFirstFit,
    DrfBestFitL2,
    DrfScarcity { alpha: f64 },
}

/// Shared knobs passed when instantiating algorithms.
pub struct AlgorithmOptions {
    pub solver_budget: Duration,
    pub epsilon: f64,
    pub seed: u64,
}

impl AlgorithmKind {
    /// Name used as the report key and CSV file stem.
    pub fn name(&self) -> String {
        match self {
            AlgorithmKind::Ilp => "Ilp".to_string(),
            AlgorithmKind::LpRoundingMostFull => "LpRoundingMostFull".to_string(),
            AlgorithmKind::LpRoundingFirstFit => "LpRoundingFirstFit".to_string(),
            AlgorithmKind::FirstFit => "FirstFit".to_string(),
            AlgorithmKind::MostFull => "MostFull".to_string(),
            AlgorithmKind::LeastFull => "LeastFull".to_string(),
            AlgorithmKind::Random => "Random".to_string(),
            AlgorithmKind::DrfFirstFit => "DrfFirstFit".to_string(),
            AlgorithmKind::DrfBestFitL2 => "DrfBestFitL2".to_string(),
            AlgorithmKind::DrfScarcity { alpha } => format!("DrfScarcity_{}", alpha),
        }
    }

    pub fn build(&self, options: &AlgorithmOptions) -> Box<dyn PlacementAlgorithm> {
        match self {
            AlgorithmKind::Ilp => Box::new(ExactAssignment::new(options.solver_budget)),
            AlgorithmKind::LpRoundingMostFull => Box::new(LpRounding::new(RepairStrategy::MostFull)),
            AlgorithmKind::LpRoundingFirstFit => Box::new(LpRounding::new(RepairStrategy::FirstFit)),
            AlgorithmKind::FirstFit => Box::new(GreedyPacker::new(FirstFit::new())),
            AlgorithmKind::MostFull => Box::new(GreedyPacker::new(MostFull::new())),
            AlgorithmKind::LeastFull => Box::new(GreedyPacker::new(LeastFull::new())),
            AlgorithmKind::Random => Box::new(GreedyPacker::new(RandomHost::new(options.seed))),
            AlgorithmKind::DrfFirstFit => {
                Box::new(DominantResourceFairness::new(HostSelection::FirstFit, options.epsilon))
            }
            AlgorithmKind::DrfBestFitL2 => {
                Box::new(DominantResourceFairness::new(HostSelection::BestFitL2, options.epsilon))
            }
            AlgorithmKind::DrfScarcity { alpha } => Box::new(DominantResourceFairness::new(
                HostSelection::ScarcityBottleneck { alpha: *alpha },
                options.epsilon,
            )),
        }
    }
}
