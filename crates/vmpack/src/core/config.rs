//! Experiment configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::placement_algorithm::AlgorithmKind;
use crate::core::scenario::{ResourceRanges, ScenarioError};

/// Holds raw experiment config parsed from a YAML file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawExperimentConfig {
    pub num_hosts: Option<u32>,
    pub initial_vms: Option<u32>,
    pub max_vms: Option<u32>,
    pub increment_vms: Option<u32>,
    pub monte_carlo_iterations: Option<u32>,
    pub base_seed: Option<u64>,
    pub epsilon: Option<f64>,
    pub solver_budget_secs: Option<u64>,
    pub host_ranges: Option<ResourceRanges>,
    pub vm_ranges: Option<ResourceRanges>,
    pub algorithms: Option<Vec<AlgorithmKind>>,
}

/// Represents experiment configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentConfig {
    /// Number of hosts generated per scenario.
    pub num_hosts: u32,
    /// Smallest workload size in the sweep.
    pub initial_vms: u32,
    /// Largest workload size in the sweep.
    pub max_vms: u32,
    /// Step between consecutive workload sizes.
    pub increment_vms: u32,
    /// Number of Monte Carlo trials.
    pub monte_carlo_iterations: u32,
    /// Seed of the first trial, trial i uses base_seed + i.
    pub base_seed: u64,
    /// Guard value used by the scarcity score.
    pub epsilon: f64,
    /// Time budget of the exact solver.
    pub solver_budget: Duration,
    /// Sampling ranges for host capacities.
    pub host_ranges: ResourceRanges,
    /// Sampling ranges for VM demands.
    pub vm_ranges: ResourceRanges,
    /// Algorithms compared in every trial.
    pub algorithms: Vec<AlgorithmKind>,
}

impl ExperimentConfig {
    /// Creates experiment config by reading parameter values from YAML file
    /// (uses defaults for omitted parameters).
    pub fn from_file(file_name: &str) -> Self {
        let raw: RawExperimentConfig = serde_yaml::from_str(
            &std::fs::read_to_string(file_name)
                .unwrap_or_else(|_| panic!("Can't read file {}", file_name)),
        )
        .unwrap_or_else(|_| panic!("Can't parse YAML from file {}", file_name));
        Self::from_raw(raw)
    }

    /// Creates experiment config from YAML string.
    pub fn from_str(content: &str) -> Self {
        let raw: RawExperimentConfig =
            serde_yaml::from_str(content).unwrap_or_else(|_| panic!("Can't parse YAML config"));
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawExperimentConfig) -> Self {
        Self {
            num_hosts: raw.num_hosts.unwrap_or(3),
            initial_vms: raw.initial_vms.unwrap_or(3),
            max_vms: raw.max_vms.unwrap_or(100),
            increment_vms: raw.increment_vms.unwrap_or(3),
            monte_carlo_iterations: raw.monte_carlo_iterations.unwrap_or(500),
            base_seed: raw.base_seed.unwrap_or(123),
            epsilon: raw.epsilon.unwrap_or(0.001),
            solver_budget: Duration::from_secs(raw.solver_budget_secs.unwrap_or(20)),
            host_ranges: raw.host_ranges.unwrap_or_else(ResourceRanges::default_host_ranges),
            vm_ranges: raw.vm_ranges.unwrap_or_else(ResourceRanges::default_vm_ranges),
            algorithms: raw.algorithms.unwrap_or_else(Self::default_algorithms),
        }
    }

    /// Full algorithm roster used when the config lists none.
    pub fn default_algorithms() -> Vec<AlgorithmKind> {
        vec![
            AlgorithmKind::Ilp,
            AlgorithmKind::LpRoundingMostFull,
            AlgorithmKind::LpRoundingFirstFit,
            AlgorithmKind::FirstFit,
            AlgorithmKind::MostFull,
            AlgorithmKind::LeastFull,
            AlgorithmKind::Random,
            AlgorithmKind::DrfFirstFit,
            AlgorithmKind::DrfBestFitL2,
            AlgorithmKind::DrfScarcity { alpha: 0.7 },
            AlgorithmKind::DrfScarcity { alpha: 0.5 },
        ]
    }

    /// Checks the config before any trial runs.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.num_hosts == 0 {
            return Err(ScenarioError::NoHosts);
        }
        if self.initial_vms == 0 || self.increment_vms == 0 || self.max_vms < self.initial_vms {
            return Err(ScenarioError::InvalidWorkloadSweep);
        }
        self.host_ranges.validate("host")?;
        self.vm_ranges.validate("vm")?;
        Ok(())
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::from_raw(RawExperimentConfig::default())
    }
}
