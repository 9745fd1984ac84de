//! Randomized host/VM scenarios for Monte Carlo trials.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::common::Allocation;
use crate::core::resources::ResourceVector;

/// Inclusive bounds for one uniformly drawn resource component.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceRange {
    pub min: f64,
    pub max: f64,
}

impl ResourceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Per-resource draw ranges for either hosts or VMs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceRanges {
    pub cpu: ResourceRange,
    pub mem: ResourceRange,
    pub net: ResourceRange,
    pub disk: ResourceRange,
}

impl ResourceRanges {
    pub fn sample(&self, rng: &mut impl Rng) -> ResourceVector {
        ResourceVector::new(
            rng.gen_range(self.cpu.min..=self.cpu.max),
            rng.gen_range(self.mem.min..=self.mem.max),
            rng.gen_range(self.net.min..=self.net.max),
            rng.gen_range(self.disk.min..=self.disk.max),
        )
    }

    pub fn validate(&self, kind: &'static str) -> Result<(), ScenarioError> {
        for (name, range) in [
            ("cpu", self.cpu),
            ("mem", self.mem),
            ("net", self.net),
            ("disk", self.disk),
        ] {
            // Capacities and demands must stay strictly positive so that
            // normalized shares are always well-defined.
            if range.min <= 0. || range.max < range.min {
                return Err(ScenarioError::InvalidRange {
                    kind,
                    resource: name,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(())
    }

    /// Host capacity ranges used when the config does not override them.
    pub fn default_host_ranges() -> Self {
        Self {
            cpu: ResourceRange::new(100_000., 1_000_000.),
            mem: ResourceRange::new(64_000., 640_000.),
            net: ResourceRange::new(1_000., 10_000.),
            disk: ResourceRange::new(1_000., 10_000.),
        }
    }

    /// VM demand ranges used when the config does not override them.
    pub fn default_vm_ranges() -> Self {
        Self {
            cpu: ResourceRange::new(10_000., 100_000.),
            mem: ResourceRange::new(6_400., 64_000.),
            net: ResourceRange::new(100., 1_000.),
            disk: ResourceRange::new(100., 1_000.),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("scenario requires at least one host")]
    NoHosts,
    #[error("workload sweep requires initial_vms >= 1, increment_vms >= 1 and max_vms >= initial_vms")]
    InvalidWorkloadSweep,
    #[error("invalid {kind} {resource} range [{min}, {max}]: bounds must be strictly positive and ordered")]
    InvalidRange {
        kind: &'static str,
        resource: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{kind} {index} has a non-positive resource component")]
    NonPositiveComponent { kind: &'static str, index: usize },
}

/// Frozen inputs of one Monte Carlo trial: host capacities and the full VM
/// demand pool. The workload of a single solve is a prefix of the pool.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub hosts: Vec<ResourceVector>,
    pub vm_pool: Vec<ResourceVector>,
}

impl Scenario {
    /// Draws a fresh scenario with uniformly random host capacities and VM
    /// demands within the given ranges.
    pub fn generate(
        num_hosts: usize,
        pool_size: usize,
        host_ranges: &ResourceRanges,
        vm_ranges: &ResourceRanges,
        rng: &mut impl Rng,
    ) -> Result<Self, ScenarioError> {
        if num_hosts == 0 {
            return Err(ScenarioError::NoHosts);
        }
        host_ranges.validate("host")?;
        vm_ranges.validate("vm")?;

        let hosts = (0..num_hosts).map(|_| host_ranges.sample(rng)).collect();
        let vm_pool = (0..pool_size).map(|_| vm_ranges.sample(rng)).collect();
        Ok(Self { hosts, vm_pool })
    }

    /// Builds a scenario from explicit capacities and demands, e.g. for tests
    /// and reference fixtures.
    pub fn from_parts(hosts: Vec<ResourceVector>, vm_pool: Vec<ResourceVector>) -> Result<Self, ScenarioError> {
        if hosts.is_empty() {
            return Err(ScenarioError::NoHosts);
        }
        for (kind, vectors) in [("host", &hosts), ("vm", &vm_pool)] {
            for (index, v) in vectors.iter().enumerate() {
                if !v.is_strictly_positive() {
                    return Err(ScenarioError::NonPositiveComponent { kind, index });
                }
            }
        }
        Ok(Self { hosts, vm_pool })
    }

    pub fn num_hosts(&self) -> usize {
        self.hosts.len()
    }

    pub fn pool_size(&self) -> usize {
        self.vm_pool.len()
    }

    /// The allocation request for the VM with the given pool index.
    pub fn allocation(&self, vm: u32) -> Allocation {
        Allocation {
            id: vm,
            demand: self.vm_pool[vm as usize],
        }
    }

    pub fn total_capacity(&self) -> ResourceVector {
        self.hosts
            .iter()
            .fold(ResourceVector::zero(), |acc, &cap| acc + cap)
    }
}
