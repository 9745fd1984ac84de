//! Monte Carlo experiment over the configured algorithms.

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use threadpool::ThreadPool;
use thiserror::Error;

use crate::core::assignment::AllocationRun;
use crate::core::config::ExperimentConfig;
use crate::core::migration::MigrationTracker;
use crate::core::placement_algorithm::AlgorithmOptions;
use crate::core::resources::RESOURCE_COUNT;
use crate::core::scenario::{Scenario, ScenarioError};
use crate::core::solver::SolverError;

#[derive(Debug, Error)]
pub enum TrialError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// One line of the aggregated report: one algorithm at one workload size,
/// averaged over all completed trials.
#[derive(Clone, Debug, Serialize)]
pub struct AggregateRow {
    pub algorithm: String,
    pub num_vms: u32,
    pub trials: u32,
    pub placed_vms: f64,
    pub alloc_rate: f64,
    pub cpu_util_rate: f64,
    pub ram_util_rate: f64,
    pub net_util_rate: f64,
    pub disk_util_rate: f64,
    pub migrations: f64,
    pub migration_rate: f64,
}

#[derive(Default)]
struct Accumulator {
    trials: u32,
    placed: u64,
    migrations: u64,
    util_sums: [f64; RESOURCE_COUNT],
}

/// Experiment output: the raw per-run records plus per-(algorithm, size)
/// averages, grouped in the order the algorithms were configured.
#[derive(Clone, Debug, Serialize)]
pub struct ExperimentResults {
    #[serde(skip)]
    pub runs: Vec<AllocationRun>,
    pub rows: Vec<AggregateRow>,
}

impl ExperimentResults {
    /// Aggregates raw runs into per-(algorithm, size) arithmetic means.
    /// Utilization is averaged over the per-trial rates, since host
    /// capacities differ between trials.
    pub fn from_trials(runs: Vec<AllocationRun>) -> Self {
        let mut groups: IndexMap<(String, u32), Accumulator> = IndexMap::new();
        for run in &runs {
            let acc = groups.entry((run.algorithm.clone(), run.num_vms)).or_default();
            acc.trials += 1;
            acc.placed += run.placed as u64;
            acc.migrations += run.migrations as u64;
            let rates = run.util_rates();
            for r in 0..RESOURCE_COUNT {
                acc.util_sums[r] += rates[r];
            }
        }

        let mut rows = Vec::with_capacity(groups.len());
        for ((algorithm, num_vms), acc) in groups {
            let trials = acc.trials as f64;
            let requested = trials * num_vms as f64;
            rows.push(AggregateRow {
                algorithm,
                num_vms,
                trials: acc.trials,
                placed_vms: acc.placed as f64 / trials,
                alloc_rate: acc.placed as f64 * 100. / requested,
                cpu_util_rate: acc.util_sums[0] / trials,
                ram_util_rate: acc.util_sums[1] / trials,
                net_util_rate: acc.util_sums[2] / trials,
                disk_util_rate: acc.util_sums[3] / trials,
                migrations: acc.migrations as f64 / trials,
                migration_rate: acc.migrations as f64 * 100. / requested,
            });
        }
        Self { runs, rows }
    }
}

/// Runs the full Monte Carlo comparison and aggregates the results.
pub struct Experiment {
    config: ExperimentConfig,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> Result<Self, ScenarioError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Runs all trials on the given number of threads (at least one).
    /// Trials that fail are logged and excluded from aggregation.
    pub fn run(&self, num_threads: usize) -> ExperimentResults {
        let pool = ThreadPool::new(num_threads.max(1));
        let runs = Arc::new(Mutex::new(Vec::new()));

        for trial in 0..self.config.monte_carlo_iterations {
            let config = self.config.clone();
            let runs = runs.clone();
            pool.execute(move || match run_trial(&config, trial) {
                Ok(mut trial_runs) => {
                    runs.lock().unwrap().append(&mut trial_runs);
                }
                Err(err) => {
                    error!("Trial {} failed: {}", trial, err);
                }
            });
        }
        pool.join();
        info!("Finished {} trials", self.config.monte_carlo_iterations);

        let runs = runs.lock().unwrap().drain(..).collect();
        ExperimentResults::from_trials(runs)
    }
}

/// Runs every configured algorithm over the full workload sweep of one
/// freshly generated scenario.
pub fn run_trial(config: &ExperimentConfig, trial: u32) -> Result<Vec<AllocationRun>, TrialError> {
    let seed = config.base_seed + trial as u64;
    let mut rng = StdRng::seed_from_u64(seed);
    let scenario = Scenario::generate(
        config.num_hosts as usize,
        config.max_vms as usize,
        &config.host_ranges,
        &config.vm_ranges,
        &mut rng,
    )?;

    let options = AlgorithmOptions {
        solver_budget: config.solver_budget,
        epsilon: config.epsilon,
        seed,
    };
    let mut runs = Vec::new();
    for kind in &config.algorithms {
        let algorithm = kind.build(&options);
        let mut tracker = MigrationTracker::new();
        let mut num_vms = config.initial_vms;
        while num_vms <= config.max_vms {
            let outcome = algorithm.place(&scenario, num_vms)?;
            let migrations = tracker.record(&outcome.assignment);
            runs.push(AllocationRun::new(
                kind.name(),
                &scenario,
                &outcome.assignment,
                migrations,
                outcome.fell_back,
                outcome.hit_iteration_cap,
            ));
            num_vms += config.increment_vms;
        }
    }
    Ok(runs)
}
