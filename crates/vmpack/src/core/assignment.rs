//! Placement assignments and per-run allocation statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::resources::{ResourceVector, RESOURCE_COUNT};
use crate::core::scenario::Scenario;

/// Result of one placement algorithm run: which VMs landed on which hosts.
///
/// VMs absent from the mapping were requested but could not be placed.
#[derive(Clone, Debug, Serialize)]
pub struct PlacementAssignment {
    pub requested: u32,
    mapping: BTreeMap<u32, u32>,
}

impl PlacementAssignment {
    pub fn new(requested: u32) -> Self {
        Self {
            requested,
            mapping: BTreeMap::new(),
        }
    }

    /// Records that the VM was placed on the host.
    pub fn assign(&mut self, vm_id: u32, host_id: u32) {
        self.mapping.insert(vm_id, host_id);
    }

    /// Returns the host the VM was placed on, if any.
    pub fn host_of(&self, vm_id: u32) -> Option<u32> {
        self.mapping.get(&vm_id).copied()
    }

    pub fn placed_count(&self) -> u32 {
        self.mapping.len() as u32
    }

    /// Iterates over (vm_id, host_id) pairs in ascending VM id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.mapping.iter().map(|(&vm, &host)| (vm, host))
    }
}

/// Aggregated outcome of one algorithm run at one workload size.
#[derive(Clone, Debug, Serialize)]
pub struct AllocationRun {
    pub algorithm: String,
    pub num_vms: u32,
    pub placed: u32,
    pub used: ResourceVector,
    pub total: ResourceVector,
    pub migrations: u32,
    pub fell_back: bool,
    pub hit_iteration_cap: bool,
}

impl AllocationRun {
    pub fn new(
        algorithm: String,
        scenario: &Scenario,
        assignment: &PlacementAssignment,
        migrations: u32,
        fell_back: bool,
        hit_iteration_cap: bool,
    ) -> Self {
        let mut used = ResourceVector::zero();
        for (vm_id, _) in assignment.iter() {
            used += scenario.vm_pool[vm_id as usize];
        }
        Self {
            algorithm,
            num_vms: assignment.requested,
            placed: assignment.placed_count(),
            used,
            total: scenario.total_capacity(),
            migrations,
            fell_back,
            hit_iteration_cap,
        }
    }

    /// Share of requested VMs that were placed, in percent.
    pub fn alloc_rate(&self) -> f64 {
        self.placed as f64 * 100. / self.num_vms as f64
    }

    /// Per-resource utilization of the whole pool, in percent.
    pub fn util_rates(&self) -> [f64; RESOURCE_COUNT] {
        let util = self.used.div(&self.total);
        let arr = util.as_array();
        [arr[0] * 100., arr[1] * 100., arr[2] * 100., arr[3] * 100.]
    }

    /// Migrations relative to the number of requested VMs, in percent.
    pub fn migration_rate(&self) -> f64 {
        self.migrations as f64 * 100. / self.num_vms as f64
    }
}
