//! LP/ILP adapter for the assignment problem.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use good_lp::{constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable};
use thiserror::Error;

use crate::core::resources::{ResourceVector, RESOURCE_COUNT};

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("solver adapter error: {0}")]
    Adapter(String),
}

/// VM-to-host assignment problem in the form consumed by the LP backend.
///
/// One decision variable per (host, vm) pair, laid out host-major:
/// index `host * num_vms + vm`. The objective maximizes the number of
/// placed VMs (sum of all variables). Each host contributes one capacity
/// row per resource and each VM one at-most-one-host row.
pub struct AssignmentProblem {
    capacities: Vec<ResourceVector>,
    demands: Vec<ResourceVector>,
    binary: bool,
}

impl AssignmentProblem {
    pub fn new(capacities: Vec<ResourceVector>, demands: Vec<ResourceVector>, binary: bool) -> Self {
        Self {
            capacities,
            demands,
            binary,
        }
    }

    pub fn num_hosts(&self) -> usize {
        self.capacities.len()
    }

    pub fn num_vms(&self) -> usize {
        self.demands.len()
    }

    /// Solves the problem, optionally within the given time budget.
    ///
    /// Returns `Ok(None)` when the model is infeasible, unbounded, or the
    /// budget ran out before a solution was found. Backend failures are
    /// reported as [SolverError::Adapter].
    pub fn solve(self, budget: Option<Duration>) -> Result<Option<Vec<f64>>, SolverError> {
        match budget {
            None => self.solve_inner(),
            Some(budget) => {
                let (tx, rx) = mpsc::channel();
                thread::spawn(move || {
                    // Receiver may be gone if the budget expired, ignore.
                    let _ = tx.send(self.solve_inner());
                });
                match rx.recv_timeout(budget) {
                    Ok(result) => result,
                    Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
                    Err(mpsc::RecvTimeoutError::Disconnected) => {
                        Err(SolverError::Adapter("solver thread terminated unexpectedly".to_string()))
                    }
                }
            }
        }
    }

    fn solve_inner(&self) -> Result<Option<Vec<f64>>, SolverError> {
        let num_hosts = self.num_hosts();
        let num_vms = self.num_vms();
        let mut vars = ProblemVariables::new();
        let mut x: Vec<Variable> = Vec::with_capacity(num_hosts * num_vms);
        for _ in 0..num_hosts * num_vms {
            let def = if self.binary {
                variable().binary()
            } else {
                variable().min(0.).max(1.)
            };
            x.push(vars.add(def));
        }

        let objective: Expression = x.iter().map(|&v| 1.0 * v).sum();
        let mut model = vars.maximise(objective).using(default_solver);

        for (host, capacity) in self.capacities.iter().enumerate() {
            let cap = capacity.as_array();
            for r in 0..RESOURCE_COUNT {
                let load: Expression = (0..num_vms)
                    .map(|vm| self.demands[vm].as_array()[r] * x[host * num_vms + vm])
                    .sum();
                model = model.with(constraint::leq(load, cap[r]));
            }
        }
        for vm in 0..num_vms {
            let placements: Expression = (0..num_hosts).map(|host| 1.0 * x[host * num_vms + vm]).sum();
            model = model.with(constraint::leq(placements, 1.));
        }

        match model.solve() {
            Ok(solution) => Ok(Some(x.iter().map(|&v| solution.value(v)).collect())),
            Err(ResolutionError::Infeasible) | Err(ResolutionError::Unbounded) => Ok(None),
            Err(err) => Err(SolverError::Adapter(err.to_string())),
        }
    }
}
